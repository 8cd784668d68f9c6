//! Sign-in, sign-up, password reset and password change flows
//!
//! [`sign_in`] and [`sign_up`] check the form locally before any request is
//! made, so a bad field never costs a round trip.
//!
//! [`PasswordResetFlow`] is the forgot-password form: `Auth → Forgot → Otp →
//! Reset → Auth`. Each step validates its fields locally, then calls one
//! backend endpoint. A failure leaves the flow on the same step with the
//! message in [`PasswordResetFlow::error`].
//!
//! [`ChangePasswordForm`] is the signed-in variant: verify the current
//! password, then set a new one.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::api::{Backend, LoginResponse};
use crate::error::{ApiError, BuzzError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_OTP_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetStep {
    /// Regular sign-in form
    #[default]
    Auth,
    /// Asking for the account email
    Forgot,
    /// Waiting for the emailed code
    Otp,
    /// Choosing the new password
    Reset,
}

#[derive(Debug, Default)]
pub struct PasswordResetFlow {
    step: ResetStep,
    email: String,
    otp_verified: bool,
    error: Option<String>,
    notice: Option<String>,
}

/// Prefer the backend's own explanation for an explicit rejection
fn failure_message(err: &BuzzError, fallback: &str) -> String {
    match err {
        BuzzError::Api(ApiError::Rejected(msg)) if !msg.is_empty() => msg.clone(),
        _ => fallback.to_string(),
    }
}

fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        Err("Please enter your email address")
    } else if !email.contains('@') {
        Err("Please enter a valid email address")
    } else {
        Ok(())
    }
}

/// Sign in with email and password after checking the fields locally
pub async fn sign_in(backend: &dyn Backend, email: &str, password: &SecretString) -> Result<LoginResponse> {
    validate_email(email).map_err(|m| BuzzError::Validation(m.to_string()))?;
    let password_len = password.expose_secret().chars().count();
    if password_len == 0 {
        return Err(BuzzError::Validation(
            "Please fill in all required fields".to_string(),
        ));
    }
    if password_len < MIN_PASSWORD_LEN {
        return Err(BuzzError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let response = backend.login(email.trim(), password).await?;
    if response.token.trim().is_empty() {
        return Err(ApiError::Decode("Login response carried no token".to_string()).into());
    }
    info!(email = %email.trim(), "Signed in");
    Ok(response)
}

/// Fields of the create-account form
#[derive(Debug, Clone)]
pub struct SignUp {
    pub display_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub accept_terms: bool,
}

impl SignUp {
    /// First failing field check, in form order
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        let email = self.email.trim();
        let password = self.password.expose_secret();
        if email.is_empty() || password.is_empty() {
            return Err("Please fill in all required fields");
        }
        if !email.contains('@') {
            return Err("Please enter a valid email address");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters long");
        }
        if self.display_name.trim().is_empty() {
            return Err("Please enter your name");
        }
        if password != self.confirm_password.expose_secret() {
            return Err("Passwords do not match");
        }
        if !self.accept_terms {
            return Err("Please accept the terms and conditions");
        }
        Ok(())
    }
}

/// Create an account after checking the form locally
///
/// A response without both a token and a user is treated as a failed
/// registration.
pub async fn sign_up(backend: &dyn Backend, form: &SignUp) -> Result<LoginResponse> {
    form.validate()
        .map_err(|m| BuzzError::Validation(m.to_string()))?;

    let email = form.email.trim();
    let response = backend
        .register(form.display_name.trim(), email, &form.password)
        .await?;
    if response.token.trim().is_empty() || response.user.is_none() {
        return Err(ApiError::Decode("Invalid response from server".to_string()).into());
    }
    info!(email = %email, "Account created");
    Ok(response)
}

/// Greeting shown after a successful sign-up
pub fn welcome_message(response: &LoginResponse, form: &SignUp) -> String {
    let user = response.user.as_ref();
    let who = Some(form.display_name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| user.and_then(|u| u.name.clone()))
        .or_else(|| user.and_then(|u| u.email.clone()))
        .unwrap_or_else(|| form.email.trim().to_string());
    format!("Welcome to BuzzConnect, {}!", who)
}

impl PasswordResetFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> ResetStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn otp_verified(&self) -> bool {
        self.otp_verified
    }

    /// Inline error for the current step
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last success message
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn reject(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.error = Some(message.clone());
        Err(BuzzError::Validation(message))
    }

    fn expect_step(&self, expected: ResetStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(BuzzError::InvalidInput(format!(
                "Not available at the {:?} step",
                self.step
            )))
        }
    }

    /// "Forgot password?" from the sign-in form
    pub fn forgot_password(&mut self) {
        self.step = ResetStep::Forgot;
        self.error = None;
        self.notice = None;
    }

    /// Send a one-time code to `email` and move on to code entry
    pub async fn send_otp(&mut self, backend: &dyn Backend, email: &str) -> Result<()> {
        self.expect_step(ResetStep::Forgot)?;
        if let Err(message) = validate_email(email) {
            return self.reject(message);
        }

        let email = email.trim().to_string();
        match backend.send_otp(&email).await {
            Ok(()) => {
                info!(email = %email, "OTP sent");
                self.email = email;
                self.step = ResetStep::Otp;
                self.error = None;
                self.notice = Some("OTP sent to your email!".to_string());
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "send-otp failed");
                let message = failure_message(&e, "Failed to send OTP. Please try again.");
                self.reject(message)
            }
        }
    }

    /// Send the code again to the email already entered
    pub async fn resend_otp(&mut self, backend: &dyn Backend) -> Result<()> {
        self.expect_step(ResetStep::Otp)?;
        match backend.send_otp(&self.email).await {
            Ok(()) => {
                self.error = None;
                self.notice = Some("OTP resent to your email!".to_string());
                Ok(())
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to resend OTP. Please try again.");
                self.reject(message)
            }
        }
    }

    pub async fn verify_otp(&mut self, backend: &dyn Backend, otp: &str) -> Result<()> {
        self.expect_step(ResetStep::Otp)?;
        let otp = otp.trim();
        if otp.chars().count() < MIN_OTP_LEN {
            return self.reject("Please enter a valid OTP");
        }

        match backend.verify_otp(&self.email, otp).await {
            Ok(()) => {
                self.otp_verified = true;
                self.step = ResetStep::Reset;
                self.error = None;
                self.notice = Some("OTP verified successfully!".to_string());
                Ok(())
            }
            Err(e) => {
                let message = failure_message(&e, "Invalid OTP. Please try again.");
                self.reject(message)
            }
        }
    }

    /// Set the new password; on success the flow returns to the sign-in form
    pub async fn reset_password(
        &mut self,
        backend: &dyn Backend,
        new_password: &SecretString,
        confirm: &SecretString,
    ) -> Result<()> {
        self.expect_step(ResetStep::Reset)?;
        let new = new_password.expose_secret();
        let confirm = confirm.expose_secret();

        if new.is_empty() || confirm.is_empty() {
            return self.reject("Please fill in all required fields");
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return self.reject("Password must be at least 6 characters long");
        }
        if new != confirm {
            return self.reject("Passwords do not match");
        }
        if !self.otp_verified {
            return self.reject("Please verify OTP first");
        }

        match backend.reset_password(&self.email, new_password).await {
            Ok(()) => {
                info!(email = %self.email, "Password reset");
                self.back_to_login();
                self.notice = Some("Password reset successfully!".to_string());
                Ok(())
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to reset password. Please try again.");
                self.reject(message)
            }
        }
    }

    /// Abandon the flow and clear everything entered
    pub fn back_to_login(&mut self) {
        *self = Self::default();
    }
}

/// Settings form for changing the signed-in user's password
#[derive(Debug, Default)]
pub struct ChangePasswordForm {
    current: Option<SecretString>,
}

impl ChangePasswordForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_verified(&self) -> bool {
        self.current.is_some()
    }

    /// Check the current password with the backend before a new one may be set
    pub async fn verify_current(&mut self, backend: &dyn Backend, current: SecretString) -> Result<()> {
        if current.expose_secret().trim().is_empty() {
            return Err(BuzzError::Validation(
                "Please enter your current password".to_string(),
            ));
        }

        match backend.verify_password(&current).await {
            Ok(()) => {
                self.current = Some(current);
                Ok(())
            }
            Err(BuzzError::Api(ApiError::Rejected(_))) | Err(BuzzError::Api(ApiError::Authentication(_))) => {
                self.current = None;
                Err(BuzzError::Validation("Current password is incorrect".to_string()))
            }
            Err(e) => {
                self.current = None;
                Err(e)
            }
        }
    }

    pub async fn update(
        &mut self,
        backend: &dyn Backend,
        new_password: &SecretString,
        confirm: &SecretString,
    ) -> Result<()> {
        let Some(current) = self.current.as_ref() else {
            return Err(BuzzError::Validation(
                "Please verify your current password first".to_string(),
            ));
        };
        let new = new_password.expose_secret();
        let confirm = confirm.expose_secret();

        if new.is_empty() || confirm.is_empty() {
            return Err(BuzzError::Validation(
                "Please fill in both password fields".to_string(),
            ));
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(BuzzError::Validation(
                "New password must be at least 6 characters long".to_string(),
            ));
        }
        if new != confirm {
            return Err(BuzzError::Validation("New passwords do not match".to_string()));
        }
        if new == current.expose_secret() {
            return Err(BuzzError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        backend.update_password(current, new_password).await?;
        info!("Password updated");
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn test_sign_in() {
        let backend = MockBackend::new();

        let err = sign_in(&backend, "", &secret("secret123")).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter your email address");
        let err = sign_in(&backend, "user@example.com", &secret("")).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
        assert_eq!(backend.calls().login, 0);

        let err = sign_in(&backend, "user@example.com", &secret("abc12")).await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters long");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(backend.calls().login, 0);

        let err = sign_in(&backend, "user@example.com", &secret("wrongpass")).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let response = sign_in(&backend, " user@example.com ", &secret("secret123"))
            .await
            .unwrap();
        assert_eq!(response.token, "mock-token");
        assert_eq!(
            response.user.unwrap().email.as_deref(),
            Some("user@example.com")
        );
    }

    fn sign_up_form() -> SignUp {
        SignUp {
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: secret("secret123"),
            confirm_password: secret("secret123"),
            accept_terms: true,
        }
    }

    #[tokio::test]
    async fn test_sign_up_field_checks() {
        let backend = MockBackend::new();

        let cases: [(fn(&mut SignUp), &str); 7] = [
            (|f: &mut SignUp| f.email = " ".to_string(), "Please fill in all required fields"),
            (|f: &mut SignUp| f.password = secret(""), "Please fill in all required fields"),
            (|f: &mut SignUp| f.email = "ada.example.com".to_string(), "Please enter a valid email address"),
            (|f: &mut SignUp| f.password = secret("abc"), "Password must be at least 6 characters long"),
            (|f: &mut SignUp| f.display_name = "  ".to_string(), "Please enter your name"),
            (|f: &mut SignUp| f.confirm_password = secret("secret124"), "Passwords do not match"),
            (|f: &mut SignUp| f.accept_terms = false, "Please accept the terms and conditions"),
        ];
        for (edit, expected) in cases {
            let mut form = sign_up_form();
            edit(&mut form);
            let err = sign_up(&backend, &form).await.unwrap_err();
            assert_eq!(err.to_string(), expected);
            assert_eq!(err.exit_code(), 3);
        }
        assert_eq!(backend.calls().register, 0);

        // A short password is reported before a missing name
        let mut form = sign_up_form();
        form.display_name.clear();
        form.password = secret("abc");
        let err = sign_up(&backend, &form).await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters long");
    }

    #[tokio::test]
    async fn test_sign_up() {
        let backend = MockBackend::new();
        let mut form = sign_up_form();
        form.email = " ada@example.com ".to_string();

        let response = sign_up(&backend, &form).await.unwrap();
        assert_eq!(response.token, "mock-token");
        assert_eq!(backend.registered(), vec!["ada@example.com".to_string()]);
        assert_eq!(welcome_message(&response, &form), "Welcome to BuzzConnect, Ada!");

        let err = sign_up(&backend, &form).await.unwrap_err();
        assert_eq!(err.user_message(), "User already exists");
        assert_eq!(backend.calls().register, 2);
    }

    #[tokio::test]
    async fn test_full_reset_flow() {
        let backend = MockBackend::new();
        let mut flow = PasswordResetFlow::new();
        assert_eq!(flow.step(), ResetStep::Auth);

        flow.forgot_password();
        flow.send_otp(&backend, " user@example.com ").await.unwrap();
        assert_eq!(flow.step(), ResetStep::Otp);
        assert_eq!(flow.email(), "user@example.com");
        assert_eq!(backend.otp_emails(), vec!["user@example.com"]);

        flow.resend_otp(&backend).await.unwrap();
        assert_eq!(flow.notice(), Some("OTP resent to your email!"));
        assert_eq!(backend.calls().send_otp, 2);

        flow.verify_otp(&backend, "123456").await.unwrap();
        assert_eq!(flow.step(), ResetStep::Reset);
        assert!(flow.otp_verified());

        flow.reset_password(&backend, &secret("newpass1"), &secret("newpass1"))
            .await
            .unwrap();
        assert_eq!(flow.step(), ResetStep::Auth);
        assert_eq!(flow.email(), "");
        assert!(!flow.otp_verified());
        assert_eq!(flow.notice(), Some("Password reset successfully!"));
        assert_eq!(backend.password(), "newpass1");
    }

    #[tokio::test]
    async fn test_email_validation_keeps_step() {
        let backend = MockBackend::new();
        let mut flow = PasswordResetFlow::new();
        flow.forgot_password();

        let err = flow.send_otp(&backend, "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter your email address");
        let err = flow.send_otp(&backend, "user.example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");
        assert_eq!(flow.error(), Some("Please enter a valid email address"));
        assert_eq!(flow.step(), ResetStep::Forgot);
        assert_eq!(backend.calls().send_otp, 0);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_step() {
        let backend =
            MockBackend::new().failing_send_otp(ApiError::Network("offline".to_string()));
        let mut flow = PasswordResetFlow::new();
        flow.forgot_password();

        let err = flow.send_otp(&backend, "user@example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to send OTP. Please try again.");
        assert_eq!(flow.step(), ResetStep::Forgot);

        let backend = MockBackend::new()
            .failing_send_otp(ApiError::Rejected("No account with that email".to_string()));
        let err = flow.send_otp(&backend, "user@example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "No account with that email");
    }

    #[tokio::test]
    async fn test_otp_checks() {
        let backend = MockBackend::new();
        let mut flow = PasswordResetFlow::new();
        flow.forgot_password();
        flow.send_otp(&backend, "user@example.com").await.unwrap();

        let err = flow.verify_otp(&backend, "12").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid OTP");

        let err = flow.verify_otp(&backend, "999999").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid OTP. Please try again.");
        assert_eq!(flow.step(), ResetStep::Otp);
        assert!(!flow.otp_verified());
    }

    #[tokio::test]
    async fn test_reset_field_checks() {
        let backend = MockBackend::new();
        let mut flow = PasswordResetFlow::new();
        flow.forgot_password();
        flow.send_otp(&backend, "user@example.com").await.unwrap();
        flow.verify_otp(&backend, "123456").await.unwrap();

        let cases = [
            ("", "", "Please fill in all required fields"),
            ("abc", "abc", "Password must be at least 6 characters long"),
            ("abcdef", "abcdeg", "Passwords do not match"),
        ];
        for (new, confirm, expected) in cases {
            let err = flow
                .reset_password(&backend, &secret(new), &secret(confirm))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
            assert_eq!(flow.step(), ResetStep::Reset);
        }
        assert_eq!(backend.calls().reset_password, 0);
    }

    #[tokio::test]
    async fn test_steps_out_of_order_rejected() {
        let backend = MockBackend::new();
        let mut flow = PasswordResetFlow::new();
        assert!(flow.verify_otp(&backend, "123456").await.is_err());
        assert!(flow
            .reset_password(&backend, &secret("abcdef"), &secret("abcdef"))
            .await
            .is_err());
        assert_eq!(backend.calls().verify_otp, 0);
    }

    #[test]
    fn test_back_to_login_clears_form() {
        let mut flow = PasswordResetFlow::new();
        flow.forgot_password();
        flow.email = "user@example.com".to_string();
        flow.error = Some("x".to_string());
        flow.back_to_login();
        assert_eq!(flow.step(), ResetStep::Auth);
        assert_eq!(flow.email(), "");
        assert_eq!(flow.error(), None);
    }

    #[tokio::test]
    async fn test_change_password() {
        let backend = MockBackend::new();
        let mut form = ChangePasswordForm::new();

        let err = form
            .update(&backend, &secret("another1"), &secret("another1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please verify your current password first");

        let err = form.verify_current(&backend, secret("wrong")).await.unwrap_err();
        assert_eq!(err.to_string(), "Current password is incorrect");
        assert!(!form.is_verified());

        form.verify_current(&backend, secret("secret123")).await.unwrap();
        assert!(form.is_verified());

        let err = form
            .update(&backend, &secret("secret123"), &secret("secret123"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "New password must be different from current password"
        );

        form.update(&backend, &secret("another1"), &secret("another1"))
            .await
            .unwrap();
        assert_eq!(backend.password(), "another1");
        assert!(!form.is_verified());
    }
}
