//! Form validation for the authentication screens.
//!
//! Validation runs before anything is sent to the backend. Failures are reported per field so
//! pages can render them inline next to the offending input.

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::{CoreError, CoreResult};
use emr_types::{EmailAddress, NonEmptyText, TextError};
use std::fmt;

/// A validation failure tied to one form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Rules a new password can break.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordViolation {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordViolation {
    pub fn message(self) -> String {
        match self {
            PasswordViolation::TooShort => {
                format!("Mật khẩu phải có ít nhất {MIN_PASSWORD_LENGTH} ký tự")
            }
            PasswordViolation::MissingUppercase => "Mật khẩu phải có ít nhất một chữ hoa".into(),
            PasswordViolation::MissingLowercase => {
                "Mật khẩu phải có ít nhất một chữ thường".into()
            }
            PasswordViolation::MissingDigit => "Mật khẩu phải có ít nhất một chữ số".into(),
            PasswordViolation::MissingSpecial => {
                "Mật khẩu phải có ít nhất một ký tự đặc biệt".into()
            }
        }
    }
}

/// Checks a new password against the strength rules, returning every rule it breaks.
pub fn validate_password(password: &str) -> Result<(), Vec<PasswordViolation>> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(PasswordViolation::TooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        violations.push(PasswordViolation::MissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        violations.push(PasswordViolation::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordViolation::MissingDigit);
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        violations.push(PasswordViolation::MissingSpecial);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn email_error(err: TextError) -> FieldError {
    match err {
        TextError::Empty => FieldError::new("email", "Vui lòng nhập email"),
        TextError::InvalidEmail(_) => FieldError::new("email", "Email không hợp lệ"),
    }
}

fn finish<T>(errors: Vec<FieldError>, value: impl FnOnce() -> T) -> CoreResult<T> {
    if errors.is_empty() {
        Ok(value())
    } else {
        Err(CoreError::Validation(errors))
    }
}

// ============================================================================
// FORMS
// ============================================================================

/// Credentials that passed the login form checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: EmailAddress,
    pub password: String,
}

/// Validates the login form. Password strength is not checked here; existing accounts may
/// predate the current rules.
pub fn validate_login(email: &str, password: &str) -> CoreResult<LoginCredentials> {
    let mut errors = Vec::new();

    let email = EmailAddress::parse(email).map_err(|e| errors.push(email_error(e))).ok();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Vui lòng nhập mật khẩu"));
    }

    match email {
        Some(email) => finish(errors, || LoginCredentials {
            email,
            password: password.to_string(),
        }),
        None => Err(CoreError::Validation(errors)),
    }
}

/// Validates the forgot-password form.
pub fn validate_forgot_password(email: &str) -> CoreResult<EmailAddress> {
    EmailAddress::parse(email).map_err(|e| CoreError::Validation(vec![email_error(e)]))
}

/// A reset request that passed the form checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordReset {
    pub token: NonEmptyText,
    pub new_password: String,
}

/// Validates the reset-password form: token present, strong password, matching confirmation.
pub fn validate_reset_password(
    token: &str,
    password: &str,
    confirmation: &str,
) -> CoreResult<PasswordReset> {
    let mut errors = Vec::new();

    let token = NonEmptyText::new(token)
        .map_err(|_| {
            errors.push(FieldError::new(
                "token",
                "Liên kết đặt lại mật khẩu không hợp lệ",
            ))
        })
        .ok();

    if let Err(violations) = validate_password(password) {
        errors.extend(
            violations
                .into_iter()
                .map(|v| FieldError::new("password", v.message())),
        );
    }
    if password != confirmation {
        errors.push(FieldError::new(
            "confirmPassword",
            "Mật khẩu xác nhận không khớp",
        ));
    }

    match token {
        Some(token) => finish(errors, || PasswordReset {
            token,
            new_password: password.to_string(),
        }),
        None => Err(CoreError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(password: &str) -> Vec<PasswordViolation> {
        validate_password(password).err().unwrap_or_default()
    }

    #[test]
    fn test_password_accepts_all_rules_met() {
        assert_eq!(validate_password("Abcdef1!"), Ok(()));
        assert_eq!(validate_password("Mậtkhẩu9#"), Ok(()));
    }

    #[test]
    fn test_password_rejects_each_missing_rule() {
        assert_eq!(violations("Abcde1!"), vec![PasswordViolation::TooShort]);
        assert_eq!(violations("abcdef1!"), vec![PasswordViolation::MissingUppercase]);
        assert_eq!(violations("ABCDEF1!"), vec![PasswordViolation::MissingLowercase]);
        assert_eq!(violations("Abcdefg!"), vec![PasswordViolation::MissingDigit]);
        assert_eq!(violations("Abcdefg1"), vec![PasswordViolation::MissingSpecial]);
    }

    #[test]
    fn test_password_reports_every_violation() {
        assert_eq!(
            violations(""),
            vec![
                PasswordViolation::TooShort,
                PasswordViolation::MissingUppercase,
                PasswordViolation::MissingLowercase,
                PasswordViolation::MissingDigit,
                PasswordViolation::MissingSpecial,
            ]
        );
    }

    #[test]
    fn test_whitespace_is_not_special() {
        assert_eq!(violations("Abcdef1 "), vec![PasswordViolation::MissingSpecial]);
    }

    #[test]
    fn test_login_requires_email_and_password() {
        let err = validate_login("not-an-email", "").expect_err("should fail");
        match err {
            CoreError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_login_normalises_email() {
        let creds = validate_login(" BS.An@BenhVien.vn ", "x").expect("valid");
        assert_eq!(creds.email.as_str(), "bs.an@benhvien.vn");
    }

    #[test]
    fn test_reset_requires_matching_confirmation() {
        let err = validate_reset_password("tok", "Abcdef1!", "Abcdef1?").expect_err("mismatch");
        match err {
            CoreError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "confirmPassword");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reset_accepts_valid_form() {
        let reset = validate_reset_password(" tok ", "Abcdef1!", "Abcdef1!").expect("valid");
        assert_eq!(reset.token.as_str(), "tok");
    }

    #[test]
    fn test_forgot_password_validates_email() {
        assert!(validate_forgot_password("").is_err());
        assert!(validate_forgot_password("a@b.vn").is_ok());
    }
}
