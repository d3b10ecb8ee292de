//! Registration and login form input.
//!
//! Forms are validated client-side before anything is sent to the backend.
//! Validation stops at the first failing rule.

use core::fmt;

/// Minimum length of usernames and passwords, in characters.
pub const MIN_CREDENTIAL_LENGTH: usize = 6;

/// Errors produced by client-side form validation.
///
/// The display strings are shown to the user verbatim. Registration checks
/// run in declaration order except that a password mismatch is reported
/// before the password length rule.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The username field is empty.
    #[error("Username is a required field")]
    UsernameRequired,
    /// The username is shorter than [`MIN_CREDENTIAL_LENGTH`].
    #[error("Username must be at least 6 characters")]
    UsernameTooShort,
    /// The password field is empty.
    #[error("Password is a required field")]
    PasswordRequired,
    /// The password is shorter than [`MIN_CREDENTIAL_LENGTH`].
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Input of the registration form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Create a registration form from raw field values.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::UsernameRequired);
        }
        if self.username.chars().count() < MIN_CREDENTIAL_LENGTH {
            return Err(ValidationError::UsernameTooShort);
        }
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_CREDENTIAL_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

/// Input of the login form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Create a login form from raw field values.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validate the form. Login only checks presence; length rules are the
    /// backend's business for existing accounts.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input violates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::UsernameRequired);
        }
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(())
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_valid() {
        let form = RegistrationForm::new("crio.do", "learnbydoing", "learnbydoing");
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_registration_password_mismatch() {
        let form = RegistrationForm::new("crio.do", "abcdef", "abcdefg");
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_registration_rule_order() {
        // Every field is bad; the username rule is reported first
        let form = RegistrationForm::new("", "", "x");
        assert_eq!(form.validate(), Err(ValidationError::UsernameRequired));

        let form = RegistrationForm::new("abc", "", "x");
        assert_eq!(form.validate(), Err(ValidationError::UsernameTooShort));

        let form = RegistrationForm::new("abcdef", "", "x");
        assert_eq!(form.validate(), Err(ValidationError::PasswordRequired));

        // A mismatch is reported even when the password is also too short
        let form = RegistrationForm::new("abcdef", "abc", "abcd");
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));

        let form = RegistrationForm::new("abcdef", "abc", "abc");
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));
    }

    #[test]
    fn test_username_length_counts_characters() {
        let form = RegistrationForm::new("ñññññ", "secret1", "secret1");
        assert_eq!(form.validate(), Err(ValidationError::UsernameTooShort));
    }

    #[test]
    fn test_login_validation() {
        assert_eq!(
            LoginForm::new("", "pw").validate(),
            Err(ValidationError::UsernameRequired)
        );
        assert_eq!(
            LoginForm::new("user", "").validate(),
            Err(ValidationError::PasswordRequired)
        );
        assert_eq!(LoginForm::new("user", "pw").validate(), Ok(()));
    }

    #[test]
    fn test_form_debug_redacts_passwords() {
        let form = RegistrationForm::new("someone", "hunter22", "hunter22");
        let debug = format!("{form:?}");
        assert!(debug.contains("someone"));
        assert!(!debug.contains("hunter22"));
    }
}
