use regex_lite::Regex;
use static_init::dynamic;

use crate::constants::{ADMIN_EMAIL, ADMIN_NAME};
use crate::data_types::canteen_data_types::Employee;
use crate::errors::LoginError;

pub fn validate_email(email: &str) -> Result<String, LoginError> {
    #[dynamic]
    static EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@gmail\.com$").unwrap();

    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(LoginError::MissingFields);
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(LoginError::InvalidEmail);
    }

    Ok(email)
}

pub fn validate_phone(phone: &str) -> Result<String, LoginError> {
    #[dynamic]
    static PHONE_RE: Regex = Regex::new(r"^[0-9-]+$").unwrap();

    let phone = phone.trim();
    if phone.is_empty() {
        return Err(LoginError::MissingFields);
    }
    if !PHONE_RE.is_match(phone) {
        return Err(LoginError::InvalidPhone);
    }

    Ok(phone.to_string())
}

/// "jane.doe_smith@gmail.com" -> "Jane Doe Smith"
pub fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let mut name = String::with_capacity(local.len());
    let mut word_start = true;
    for c in local.chars() {
        let c = if matches!(c, '.' | '_' | '-') { ' ' } else { c };
        if word_start && c.is_alphanumeric() {
            name.extend(c.to_uppercase());
        } else {
            name.push(c);
        }
        word_start = !c.is_alphanumeric();
    }

    name
}

/// Unvalidated capture of who is using the chat; there is no real authentication
pub fn employee_login(email: &str, phone: &str) -> Result<Employee, LoginError> {
    if email.trim().is_empty() || phone.trim().is_empty() {
        return Err(LoginError::MissingFields);
    }

    let email = validate_email(email)?;
    let phone_number = validate_phone(phone)?;

    Ok(Employee {
        name: display_name(&email),
        email,
        phone_number,
    })
}

pub fn admin_identity() -> Employee {
    Employee {
        name: ADMIN_NAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        phone_number: String::new(),
    }
}
