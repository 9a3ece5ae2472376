//! Field patterns and length limits shared by every form.

use regex::Regex;

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.+_-]+@[a-zA-Z0-9._-]+\.[a-zA-Z]+$";
/// Developer first/last names: ASCII letters only.
pub const PERSON_NAME_PATTERN: &str = r"^[a-zA-Z]+$";
/// Organization representative: letter runs separated by internal whitespace.
pub const REP_NAME_PATTERN: &str = r"^[a-zA-Z]+(?:\s+[a-zA-Z]+)*$";
/// Password character classes, each of which must appear. ASCII only.
pub const PASSWORD_REQUIRED_PATTERNS: [&str; 3] = ["[a-z]", "[A-Z]", "[0-9]"];
pub const PASSWORD_FORBIDDEN_PATTERN: &str = r"\s";

pub const NAME_MIN_LEN: usize = 2;
pub const PASSWORD_MIN_LEN: usize = 5;
pub const CITY_MIN_LEN: usize = 2;
pub const STATE_MIN_LEN: usize = 2;
pub const STREET_MIN_LEN: usize = 5;
pub const TITLE_MIN_LEN: usize = 2;
pub const DESCRIPTION_MIN_LEN: usize = 15;

/// Length in characters, not bytes.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

pub fn is_valid_email(value: &str) -> bool {
    matches(EMAIL_PATTERN, value)
}

pub fn is_person_name(value: &str) -> bool {
    matches(PERSON_NAME_PATTERN, value)
}

pub fn is_rep_name(value: &str) -> bool {
    matches(REP_NAME_PATTERN, value)
}

/// At least one uppercase letter, one lowercase letter and one digit, and no
/// whitespace. Length is checked separately.
pub fn is_strong_password(value: &str) -> bool {
    PASSWORD_REQUIRED_PATTERNS
        .iter()
        .all(|pattern| matches(pattern, value))
        && !matches(PASSWORD_FORBIDDEN_PATTERN, value)
}
