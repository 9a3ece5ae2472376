//! Form validation for registrations, profile edits and job postings.
//!
//! Every applicable check runs and every failure is collected, so the user
//! sees all problems at once. A check only short-circuits when it depends on
//! an earlier one (the uniqueness lookup needs a well-formed email). Nothing
//! here writes to the store.

pub mod forms;
pub mod rules;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::catalog::State;
use crate::store::Store;
use forms::{DevProfileForm, DevSignupForm, OrgSignupForm, PositionForm};
use rules::char_len;

pub const MSG_PERSON_NAME_SHORT: &str =
    "Both your first and last name must be at least 2 characters long.";
pub const MSG_PERSON_NAME_CHARS: &str = "Your name can only contain letters.";
pub const MSG_ORG_NAME_SHORT: &str =
    "Your Organization's name must be at least 2 characters long.";
pub const MSG_REP_NAME_SHORT: &str =
    "Your representative's name must be at least 2 characters long.";
pub const MSG_REP_NAME_CHARS: &str = "Your representative's name can only contain letters.";
pub const MSG_EMAIL_TAKEN: &str = "Account already exists with this Email.";
pub const MSG_EMAIL_INVALID: &str = "Email address not valid.";
pub const MSG_PASSWORD_SHORT: &str = "Password must be a minimum of 5 characters.";
pub const MSG_PASSWORD_WEAK: &str =
    "Password requires at least one uppercase, one lowercase letter, and a number.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords did not match.";
pub const MSG_DEV_ADDRESS: &str = "Must enter at least a City and State for your address.";
pub const MSG_STATE_UNKNOWN: &str = "State not recognized.";
pub const MSG_ORG_STREET: &str = "Your Organization's street address does not appear valid.";
pub const MSG_ORG_CITY: &str = "Must enter a City for your address.";
pub const MSG_ORG_STATE: &str = "Must enter a State for your address.";
pub const MSG_TITLE_SHORT: &str = "The Job title must be at least 2 characters long.";
pub const MSG_DESCRIPTION_SHORT: &str = "Your description must be at least 15 characters long.";

/// Outcome of validating one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub errors: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Which account table an email must be unique in.
#[derive(Debug, Clone, Copy)]
enum AccountTable {
    Devs,
    Orgs,
}

fn check_person_names(v: &mut Validation, first: &str, last: &str) {
    if char_len(first) < rules::NAME_MIN_LEN || char_len(last) < rules::NAME_MIN_LEN {
        v.push(MSG_PERSON_NAME_SHORT);
    } else if !rules::is_person_name(first) || !rules::is_person_name(last) {
        v.push(MSG_PERSON_NAME_CHARS);
    }
}

async fn check_new_email(
    v: &mut Validation,
    email: &str,
    table: AccountTable,
    store: &dyn Store,
) -> Result<(), AppError> {
    if !rules::is_valid_email(email) {
        v.push(MSG_EMAIL_INVALID);
        return Ok(());
    }
    let taken = match table {
        AccountTable::Devs => store.find_dev_by_email(email).await?.is_some(),
        AccountTable::Orgs => store.find_org_by_email(email).await?.is_some(),
    };
    if taken {
        v.push(MSG_EMAIL_TAKEN);
    }
    Ok(())
}

fn check_password(v: &mut Validation, password: &str, confirm: &str) {
    if char_len(password) < rules::PASSWORD_MIN_LEN {
        v.push(MSG_PASSWORD_SHORT);
    } else if !rules::is_strong_password(password) {
        v.push(MSG_PASSWORD_WEAK);
    } else if confirm != password {
        v.push(MSG_PASSWORD_MISMATCH);
    }
}

/// City and state are both required; the state must exist in the catalog.
async fn check_dev_address(
    v: &mut Validation,
    city: &str,
    state_code: &str,
    store: &dyn Store,
) -> Result<Option<State>, AppError> {
    if char_len(city) < rules::CITY_MIN_LEN || char_len(state_code.trim()) < rules::STATE_MIN_LEN
    {
        v.push(MSG_DEV_ADDRESS);
        return Ok(None);
    }
    let state = store.find_state_by_code(state_code).await?;
    if state.is_none() {
        v.push(MSG_STATE_UNKNOWN);
    }
    Ok(state)
}

/// Validates a developer registration. Returns the resolved state alongside
/// the outcome; it is `Some` whenever the address checks passed.
pub async fn validate_dev_signup(
    form: &DevSignupForm,
    store: &dyn Store,
) -> Result<(Validation, Option<State>), AppError> {
    let mut v = Validation::default();
    check_person_names(&mut v, &form.fname, &form.lname);
    check_new_email(&mut v, &form.email, AccountTable::Devs, store).await?;
    check_password(&mut v, &form.password, &form.confirm_password);
    let state = check_dev_address(&mut v, &form.addr_city, &form.addr_state, store).await?;
    Ok((v, state))
}

/// Validates a developer profile edit. The email is only re-checked when it
/// differs from `current_email`.
pub async fn validate_dev_update(
    form: &DevProfileForm,
    current_email: &str,
    store: &dyn Store,
) -> Result<(Validation, Option<State>), AppError> {
    let mut v = Validation::default();
    check_person_names(&mut v, &form.fname, &form.lname);
    if form.email != current_email {
        check_new_email(&mut v, &form.email, AccountTable::Devs, store).await?;
    }
    let state = check_dev_address(&mut v, &form.addr_city, &form.addr_state, store).await?;
    Ok((v, state))
}

pub async fn validate_org_signup(
    form: &OrgSignupForm,
    store: &dyn Store,
) -> Result<Validation, AppError> {
    let mut v = Validation::default();

    if char_len(&form.org_name) < rules::NAME_MIN_LEN {
        v.push(MSG_ORG_NAME_SHORT);
    }
    if char_len(&form.rep_name) < rules::NAME_MIN_LEN {
        v.push(MSG_REP_NAME_SHORT);
    } else if !rules::is_rep_name(&form.rep_name) {
        v.push(MSG_REP_NAME_CHARS);
    }

    check_new_email(&mut v, &form.email, AccountTable::Orgs, store).await?;
    check_password(&mut v, &form.password, &form.confirm_password);

    if char_len(&form.addr_street) < rules::STREET_MIN_LEN {
        v.push(MSG_ORG_STREET);
    }
    if char_len(&form.addr_city) < rules::CITY_MIN_LEN {
        v.push(MSG_ORG_CITY);
    }
    if char_len(&form.addr_state) < rules::STATE_MIN_LEN {
        v.push(MSG_ORG_STATE);
    }

    Ok(v)
}

pub fn validate_position(form: &PositionForm) -> Validation {
    let mut v = Validation::default();
    if char_len(&form.pos_name) < rules::TITLE_MIN_LEN {
        v.push(MSG_TITLE_SHORT);
    }
    if char_len(&form.pos_desc) < rules::DESCRIPTION_MIN_LEN {
        v.push(MSG_DESCRIPTION_SHORT);
    }
    v
}
