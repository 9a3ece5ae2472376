//! Form submissions as they arrive from the browser.
//!
//! Single-valued forms deserialize straight from the urlencoded body; missing
//! fields read as empty strings. Multi-select forms (`dev_lang_input`,
//! `dev_framework_input`) arrive as repeated keys and are parsed from the raw
//! key/value pairs.

use std::collections::BTreeSet;

use serde::Deserialize;

pub const LANGUAGE_INPUT: &str = "dev_lang_input";
pub const FRAMEWORK_INPUT: &str = "dev_framework_input";
pub const BIO_INPUT: &str = "dev_bio";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevSignupForm {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub addr_street: String,
    pub addr_2: String,
    pub addr_city: String,
    /// State abbreviation or name.
    pub addr_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevProfileForm {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub addr_street: String,
    pub addr_2: String,
    pub addr_city: String,
    pub addr_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrgSignupForm {
    pub org_name: String,
    pub rep_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub addr_street: String,
    pub addr_2: String,
    pub addr_city: String,
    pub addr_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Collects every integer value submitted under `key`. Non-numeric values
/// are skipped.
pub fn ids_for(pairs: &[(String, String)], key: &str) -> BTreeSet<i32> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .filter_map(|(_, v)| v.trim().parse::<i32>().ok())
        .collect()
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Clone, Default)]
pub struct PositionForm {
    pub pos_name: String,
    pub pos_desc: String,
    pub language_ids: BTreeSet<i32>,
    pub framework_ids: BTreeSet<i32>,
}

impl PositionForm {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            pos_name: first_value(pairs, "pos_name").unwrap_or_default().to_string(),
            pos_desc: first_value(pairs, "pos_desc").unwrap_or_default().to_string(),
            language_ids: ids_for(pairs, LANGUAGE_INPUT),
            framework_ids: ids_for(pairs, FRAMEWORK_INPUT),
        }
    }
}

/// Which half of the two-page skill editor a submission belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillsSubmission {
    /// Page one: bio plus the full language selection (possibly empty).
    Languages {
        bio: Option<String>,
        ids: BTreeSet<i32>,
    },
    /// Page two: the full framework selection.
    Frameworks { ids: BTreeSet<i32> },
    Empty,
}

impl SkillsSubmission {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let has_languages = pairs.iter().any(|(k, _)| k == LANGUAGE_INPUT);
        let bio = first_value(pairs, BIO_INPUT).map(str::to_string);
        if has_languages || bio.is_some() {
            return SkillsSubmission::Languages {
                bio,
                ids: ids_for(pairs, LANGUAGE_INPUT),
            };
        }
        let frameworks = ids_for(pairs, FRAMEWORK_INPUT);
        if !frameworks.is_empty() {
            return SkillsSubmission::Frameworks { ids: frameworks };
        }
        SkillsSubmission::Empty
    }
}
