//! Field validation for form input.
//!
//! This module provides the per-field validation rules used by the signup,
//! login, password-reset, profile, and tag-provisioning forms. Each rule is a
//! pure function returning the first violated constraint's message, so the
//! same rule produces the same message deterministically.
//!
//! For collecting errors across a whole form, use [`ErrorSet`].

pub mod debounce;

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Regex for a local@domain.tld shaped email address
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Regex for a six digit one-time passcode
    static ref OTP_REGEX: Regex = Regex::new(r"^\d{6}$").unwrap();

    /// Regex for an E.164-style phone number
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
}

/// Maximum accepted length for the profile address field
const ADDRESS_MAX_LEN: usize = 500;

/// Validate a required free-text field (name, serial number, ...)
pub fn validate_required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err("Enter a valid email address".to_string());
    }

    Ok(())
}

/// Validate the login password (presence only, strength is not re-checked)
pub fn validate_login_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

/// Validate password strength for signup and password reset.
///
/// Rules are checked in order (length, uppercase, digit) and only the first
/// violated rule's message is returned.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a number".to_string());
    }

    Ok(())
}

/// Validate that the confirmation field exactly matches the password.
///
/// Compared without trimming, an exact match is required.
pub fn validate_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Validate a one-time passcode
pub fn validate_otp(otp: &str) -> Result<(), String> {
    if otp.trim().is_empty() {
        return Err("OTP is required".to_string());
    }

    if !OTP_REGEX.is_match(otp.trim()) {
        return Err("OTP must be a 6-digit number".to_string());
    }

    Ok(())
}

/// Validate the terms-and-conditions checkbox
pub fn validate_terms(accepted: bool) -> Result<(), String> {
    if !accepted {
        return Err("You must accept the terms and conditions".to_string());
    }
    Ok(())
}

/// Validate a phone number
pub fn validate_phone(number: &str) -> Result<(), String> {
    if number.trim().is_empty() {
        return Err("Phone number is required".to_string());
    }

    if !PHONE_REGEX.is_match(number.trim()) {
        return Err("Enter a valid phone number".to_string());
    }

    Ok(())
}

/// Validate the profile address field
pub fn validate_address(address: &str) -> Result<(), String> {
    if address.trim().is_empty() {
        return Err("Address is required".to_string());
    }

    if address.len() > ADDRESS_MAX_LEN {
        return Err(format!(
            "Address is too long (max {} characters)",
            ADDRESS_MAX_LEN
        ));
    }

    Ok(())
}

/// Field-scoped validation errors for one form.
///
/// Holds at most one message per field. A non-empty set blocks submission;
/// the submitting component decides which field gets focus via
/// [`ErrorSet::first_of`] using its own field order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorSet {
    errors: HashMap<String, String>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one field's validation, replacing any previous
    /// message for that field and clearing it when the field is now valid.
    pub fn record(&mut self, field: impl Into<String>, outcome: Result<(), String>) {
        let field = field.into();
        match outcome {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(message) => {
                self.errors.insert(field, message);
            }
        }
    }

    /// Current message for a field, if it is invalid
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Drop all recorded errors
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// First invalid field according to the caller's field order.
    ///
    /// Used to decide which input receives focus after a blocked submit.
    pub fn first_of<'a>(&self, order: &[&'a str]) -> Option<&'a str> {
        order.iter().copied().find(|f| self.errors.contains_key(*f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Name", "Ada").is_ok());
        assert!(validate_required("Name", "").is_err());
        assert!(validate_required("Name", "   ").is_err());
        assert_eq!(
            validate_required("Serial number", "").unwrap_err(),
            "Serial number is required"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last@sub.example.co").is_ok());

        assert_eq!(validate_email("").unwrap_err(), "Email is required");
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("spaces in@local.com").is_err());
        assert!(validate_email("two@@at.com").is_err());
    }

    #[test]
    fn test_validate_login_password_presence_only() {
        // Login does not re-check strength, a weak stored password must pass.
        assert!(validate_login_password("abc").is_ok());
        assert!(validate_login_password("").is_err());
    }

    #[test]
    fn test_password_strength_rule_order() {
        assert!(validate_password_strength("Abcdef12").is_ok());

        assert_eq!(
            validate_password_strength("").unwrap_err(),
            "Password is required"
        );
        // Too short AND missing uppercase: length message wins.
        assert_eq!(
            validate_password_strength("ab1").unwrap_err(),
            "Password must be at least 8 characters"
        );
        assert_eq!(
            validate_password_strength("abcdefg1").unwrap_err(),
            "Password must contain an uppercase letter"
        );
        assert_eq!(
            validate_password_strength("Abcdefgh").unwrap_err(),
            "Password must contain a number"
        );
    }

    #[test]
    fn test_validate_confirmation_exact_match() {
        assert!(validate_confirmation("Abcdef12", "Abcdef12").is_ok());
        assert!(validate_confirmation("Abcdef12", "Abcdef12 ").is_err());
        assert!(validate_confirmation("Abcdef12", "abcdef12").is_err());
        assert!(validate_confirmation("", "").is_ok());
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp(" 123456 ").is_ok());

        assert_eq!(validate_otp("").unwrap_err(), "OTP is required");
        assert_eq!(
            validate_otp("12345").unwrap_err(),
            "OTP must be a 6-digit number"
        );
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12345a").is_err());
        assert!(validate_otp("12 456").is_err());
    }

    #[test]
    fn test_validate_terms() {
        assert!(validate_terms(true).is_ok());
        assert!(validate_terms(false).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+14155552671").is_ok());
        assert!(validate_phone("4155552671").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("+0123").is_err());
        assert!(validate_phone("555-0102").is_err());
        assert!(validate_phone("+123456789012345678").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("1 Main St").is_ok());
        assert!(validate_address("").is_err());
        assert!(validate_address(&"x".repeat(500)).is_ok());
        assert!(validate_address(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_error_set_record_and_clear() {
        let mut errors = ErrorSet::new();
        errors.record("email", validate_email("bad"));
        errors.record("otp", validate_otp("12"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));

        // A now-valid field clears its entry.
        errors.record("email", validate_email("a@b.com"));
        assert_eq!(errors.len(), 1);
        assert!(errors.get("email").is_none());

        errors.clear();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_error_set_first_of_follows_field_order() {
        let mut errors = ErrorSet::new();
        errors.record("otp", Err("bad".to_string()));
        errors.record("email", Err("bad".to_string()));

        assert_eq!(errors.first_of(&["email", "otp"]), Some("email"));
        assert_eq!(errors.first_of(&["name", "otp"]), Some("otp"));
        assert_eq!(errors.first_of(&["name"]), None);
    }
}
