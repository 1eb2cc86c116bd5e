//! Credential format validation
//!
//! Patterns come from the policy snapshot and are compiled exactly once
//! per validator. Length rules count characters rather than bytes so CJK
//! usernames and passwords are measured the way users perceive them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CredentialRules;

/// Validator for mobile, username and password formats
#[derive(Debug)]
pub struct CredentialValidator {
    mobile: Regex,
    username: Regex,
    password: Regex,
    rules: CredentialRules,
}

/// Validator compiled from the default [`CredentialRules`]
static DEFAULT_VALIDATOR: Lazy<CredentialValidator> = Lazy::new(|| {
    CredentialValidator::new(&CredentialRules::default())
        .expect("default credential patterns are valid")
});

impl CredentialValidator {
    /// Compile a validator from the given rules
    pub fn new(rules: &CredentialRules) -> Result<Self, regex::Error> {
        Ok(Self {
            mobile: Regex::new(&rules.mobile_pattern)?,
            username: Regex::new(&rules.username_pattern)?,
            password: Regex::new(&rules.password_pattern)?,
            rules: rules.clone(),
        })
    }

    /// Validator built from the default rules
    pub fn default_rules() -> &'static CredentialValidator {
        &DEFAULT_VALIDATOR
    }

    pub fn is_valid_mobile(&self, mobile: &str) -> bool {
        self.mobile.is_match(mobile)
    }

    pub fn is_valid_username(&self, username: &str) -> bool {
        let len = username.chars().count();
        len >= self.rules.username_min_length
            && len <= self.rules.username_max_length
            && self.username.is_match(username)
    }

    pub fn is_valid_password(&self, password: &str) -> bool {
        let len = password.chars().count();
        len >= self.rules.password_min_length
            && len <= self.rules.password_max_length
            && self.password.is_match(password)
    }
}
