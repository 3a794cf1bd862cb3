//! The identity-verification wizard.
//!
//! One parameterized state machine drives every OTP flow in the product:
//! password reset (collect email, verify code, set new password), signup
//! verification, and profile email change. A flow is an ordered table of
//! [`StepKind`]s plus a [`VerificationBackend`] mapping each step's submit to
//! its endpoint; the machine itself owns the form data, the per-field error
//! set, the resend cooldown, and the single-request-in-flight gate.
//!
//! Step 0 is idle. A successful submit advances one step; a failed one stays
//! put, keeps everything the user typed, and surfaces a message. Completing
//! the last step returns the machine to idle with all collected secrets
//! cleared.

pub mod cooldown;
pub mod flows;
pub mod signup_cache;

use async_trait::async_trait;

use crate::api::types::Ack;
use crate::api::ApiError;
use crate::validation::{self, ErrorSet};
use cooldown::Cooldown;

/// Seconds the resend control stays disabled after a code is (re)sent
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// Field identifiers used in error sets and focus reporting
pub mod fields {
    pub const EMAIL: &str = "email";
    pub const OTP: &str = "otp";
    pub const NEW_PASSWORD: &str = "new_password";
    pub const CONFIRM_NEW_PASSWORD: &str = "confirm_new_password";
}

/// What one wizard step collects, and which backend call its submit drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Collect the subject email and request a verification code
    RequestCode,
    /// Collect the emailed code and verify it
    VerifyCode,
    /// Collect the new password pair and apply it
    SetPassword,
}

impl StepKind {
    /// Fields validated before this step's submit, in focus order
    fn fields(self) -> &'static [&'static str] {
        match self {
            StepKind::RequestCode => &[fields::EMAIL],
            StepKind::VerifyCode => &[fields::OTP],
            StepKind::SetPassword => &[fields::NEW_PASSWORD, fields::CONFIRM_NEW_PASSWORD],
        }
    }
}

/// An ordered step table defining one verification flow
pub struct FlowSpec {
    pub name: &'static str,
    pub steps: &'static [StepKind],
    /// Banner shown when the final step succeeds
    pub success_message: &'static str,
}

/// Form data held by a wizard instance.
///
/// Lives only as long as the wizard session; cleared on completion and on
/// cancel, never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WizardForm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Endpoint table for one flow.
///
/// `request_code` doubles as the resend action: re-requesting a code is the
/// same call as requesting the first one.
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    async fn request_code(&self, form: &WizardForm) -> Result<Ack, ApiError>;

    async fn verify_code(&self, form: &WizardForm) -> Result<Ack, ApiError>;

    /// Final step for flows that set a new password. Flows whose step table
    /// carries no `SetPassword` step never call this.
    async fn set_password(&self, _form: &WizardForm) -> Result<Ack, ApiError> {
        Ok(Ack {
            success: true,
            message: None,
        })
    }
}

/// What a submit or resend attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Moved to the next step
    Advanced,
    /// Final step succeeded; the wizard is back at idle
    Completed,
    /// A fresh code was sent; the cooldown restarted
    Resent,
    /// Local validation failed; `focus` names the first offending field
    Invalid { focus: &'static str },
    /// The request failed; the wizard stays on the current step
    Failed,
    /// Nothing happened: wizard idle, request already in flight, or the
    /// control was disabled
    Ignored,
}

/// A running instance of one verification flow.
pub struct Wizard<B> {
    flow: &'static FlowSpec,
    backend: B,
    step: usize,
    form: WizardForm,
    errors: ErrorSet,
    error_message: Option<String>,
    success_message: Option<String>,
    cooldown: Cooldown,
    in_flight: bool,
}

impl<B: VerificationBackend> Wizard<B> {
    pub fn new(flow: &'static FlowSpec, backend: B) -> Self {
        Self {
            flow,
            backend,
            step: 0,
            form: WizardForm::default(),
            errors: ErrorSet::new(),
            error_message: None,
            success_message: None,
            cooldown: Cooldown::new(),
            in_flight: false,
        }
    }

    /// Current step, 1-based; 0 is idle
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_idle(&self) -> bool {
        self.step == 0
    }

    /// Kind of the current step, when not idle
    pub fn current_kind(&self) -> Option<StepKind> {
        self.step
            .checked_sub(1)
            .and_then(|i| self.flow.steps.get(i))
            .copied()
    }

    pub fn form(&self) -> &WizardForm {
        &self.form
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Banner from the last failed attempt, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Banner set when the flow completes
    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown.remaining()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start the flow. No-op unless idle.
    pub fn open(&mut self) {
        if self.step == 0 {
            self.clear_session();
            self.success_message = None;
            self.step = 1;
        }
    }

    /// Abandon the flow from any step, clearing everything entered.
    pub fn cancel(&mut self) {
        self.step = 0;
        self.clear_session();
        self.success_message = None;
    }

    /// Go back one step. Entered data is kept.
    pub fn back(&mut self) {
        if self.step > 1 && !self.in_flight {
            self.step -= 1;
            self.error_message = None;
        }
    }

    /// Update one field, re-running just that field's validation.
    pub fn set_field(&mut self, field: &str, value: &str) {
        match field {
            fields::EMAIL => self.form.email = value.to_string(),
            fields::OTP => self.form.otp = value.to_string(),
            fields::NEW_PASSWORD => self.form.new_password = value.to_string(),
            fields::CONFIRM_NEW_PASSWORD => self.form.confirm_new_password = value.to_string(),
            _ => return,
        }
        self.errors.record(field, self.validate_field(field));
    }

    /// Count the resend cooldown down one second.
    ///
    /// Driven by an external once-per-second tick source that should only run
    /// while the cooldown is active.
    pub fn tick(&mut self) {
        self.cooldown.tick();
    }

    /// Whether the resend control is currently enabled
    pub fn can_resend(&self) -> bool {
        matches!(self.current_kind(), Some(StepKind::VerifyCode))
            && !self.in_flight
            && !self.cooldown.is_active()
    }

    /// Submit the current step.
    ///
    /// Validates the step's fields first; any error blocks the request and
    /// reports the first offending field for focus. At most one request is in
    /// flight per wizard: a submit while one is pending is ignored.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(kind) = self.current_kind() else {
            return SubmitOutcome::Ignored;
        };
        if self.in_flight {
            return SubmitOutcome::Ignored;
        }

        self.error_message = None;
        for field in kind.fields() {
            self.errors.record(*field, self.validate_field(field));
        }
        if let Some(focus) = self.errors.first_of(kind.fields()) {
            return SubmitOutcome::Invalid { focus };
        }

        self.in_flight = true;
        let result = match kind {
            StepKind::RequestCode => self.backend.request_code(&self.form).await,
            StepKind::VerifyCode => self.backend.verify_code(&self.form).await,
            StepKind::SetPassword => self.backend.set_password(&self.form).await,
        };
        self.in_flight = false;

        match result {
            Ok(_) => {
                if kind == StepKind::RequestCode {
                    self.cooldown.start(RESEND_COOLDOWN_SECS);
                }
                if self.step == self.flow.steps.len() {
                    self.step = 0;
                    self.clear_session();
                    self.success_message = Some(self.flow.success_message.to_string());
                    SubmitOutcome::Completed
                } else {
                    self.step += 1;
                    SubmitOutcome::Advanced
                }
            }
            Err(err) => {
                self.error_message = Some(err.user_message());
                SubmitOutcome::Failed
            }
        }
    }

    /// Re-request the verification code from the verify step.
    ///
    /// Blocked (without issuing any request) while the cooldown is active or
    /// another request is in flight.
    pub async fn resend(&mut self) -> SubmitOutcome {
        if !self.can_resend() {
            return SubmitOutcome::Ignored;
        }

        self.error_message = None;
        self.in_flight = true;
        let result = self.backend.request_code(&self.form).await;
        self.in_flight = false;

        match result {
            Ok(_) => {
                self.cooldown.start(RESEND_COOLDOWN_SECS);
                SubmitOutcome::Resent
            }
            Err(err) => {
                self.error_message = Some(err.user_message());
                SubmitOutcome::Failed
            }
        }
    }

    fn validate_field(&self, field: &str) -> Result<(), String> {
        match field {
            fields::EMAIL => validation::validate_email(&self.form.email),
            fields::OTP => validation::validate_otp(&self.form.otp),
            fields::NEW_PASSWORD => {
                validation::validate_password_strength(&self.form.new_password)
            }
            fields::CONFIRM_NEW_PASSWORD => validation::validate_confirmation(
                &self.form.new_password,
                &self.form.confirm_new_password,
            ),
            _ => Ok(()),
        }
    }

    fn clear_session(&mut self) {
        self.form = WizardForm::default();
        self.errors.clear();
        self.error_message = None;
        self.cooldown.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::flows::{PASSWORD_RESET, SIGNUP_VERIFICATION};
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Scripted backend recording every call it receives.
    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<&'static str>>,
        fail_next: Mutex<Option<String>>,
    }

    impl MockBackend {
        fn fail_next_with(&self, message: &str) {
            *self.fail_next.lock().unwrap() = Some(message.to_string());
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: &'static str) -> Result<Ack, ApiError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_next.lock().unwrap().take() {
                Some(message) => Err(ApiError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message,
                }),
                None => Ok(Ack {
                    success: true,
                    message: None,
                }),
            }
        }
    }

    #[async_trait]
    impl VerificationBackend for &MockBackend {
        async fn request_code(&self, _form: &WizardForm) -> Result<Ack, ApiError> {
            self.answer("request_code")
        }

        async fn verify_code(&self, _form: &WizardForm) -> Result<Ack, ApiError> {
            self.answer("verify_code")
        }

        async fn set_password(&self, _form: &WizardForm) -> Result<Ack, ApiError> {
            self.answer("set_password")
        }
    }

    #[tokio::test]
    async fn test_request_step_success_advances_and_arms_cooldown() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        assert_eq!(wizard.step(), 1);

        wizard.set_field(fields::EMAIL, "a@b.com");
        assert_eq!(wizard.submit().await, SubmitOutcome::Advanced);

        assert_eq!(wizard.step(), 2);
        assert_eq!(wizard.cooldown_remaining(), RESEND_COOLDOWN_SECS);
        assert!(wizard.error_message().is_none());
        assert_eq!(backend.calls(), vec!["request_code"]);
    }

    #[tokio::test]
    async fn test_invalid_otp_blocks_locally_without_network_call() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;

        wizard.set_field(fields::OTP, "12345");
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Invalid { focus: fields::OTP }
        );

        assert_eq!(wizard.step(), 2);
        assert_eq!(
            wizard.errors().get(fields::OTP),
            Some("OTP must be a 6-digit number")
        );
        // Only the step-1 request went out.
        assert_eq!(backend.calls(), vec!["request_code"]);
    }

    #[tokio::test]
    async fn test_failed_submission_never_advances_and_keeps_data() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;
        wizard.set_field(fields::OTP, "123456");

        backend.fail_next_with("OTP has expired");
        let step_before = wizard.step();
        let form_before = wizard.form().clone();

        assert_eq!(wizard.submit().await, SubmitOutcome::Failed);

        // Same step, same data; only the message changed.
        assert_eq!(wizard.step(), step_before);
        assert_eq!(wizard.form(), &form_before);
        assert_eq!(wizard.error_message(), Some("OTP has expired"));
    }

    #[tokio::test]
    async fn test_full_reset_flow_ends_idle_with_cleared_form() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        assert_eq!(wizard.submit().await, SubmitOutcome::Advanced);

        wizard.set_field(fields::OTP, "123456");
        assert_eq!(wizard.submit().await, SubmitOutcome::Advanced);

        wizard.set_field(fields::NEW_PASSWORD, "Abcdef12");
        wizard.set_field(fields::CONFIRM_NEW_PASSWORD, "Abcdef12");
        assert_eq!(wizard.submit().await, SubmitOutcome::Completed);

        assert!(wizard.is_idle());
        assert!(wizard.success_message().is_some());
        assert_eq!(wizard.form(), &WizardForm::default());
        assert!(wizard.errors().is_empty());
        assert_eq!(
            backend.calls(),
            vec!["request_code", "verify_code", "set_password"]
        );
    }

    #[tokio::test]
    async fn test_password_step_validates_strength_then_match() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;
        wizard.set_field(fields::OTP, "123456");
        wizard.submit().await;

        wizard.set_field(fields::NEW_PASSWORD, "abcdefg1");
        wizard.set_field(fields::CONFIRM_NEW_PASSWORD, "abcdefg1");
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Invalid {
                focus: fields::NEW_PASSWORD
            }
        );
        assert_eq!(
            wizard.errors().get(fields::NEW_PASSWORD),
            Some("Password must contain an uppercase letter")
        );

        wizard.set_field(fields::NEW_PASSWORD, "Abcdef12");
        wizard.set_field(fields::CONFIRM_NEW_PASSWORD, "Abcdef13");
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Invalid {
                focus: fields::CONFIRM_NEW_PASSWORD
            }
        );

        // No network call was made for any of the blocked attempts.
        assert_eq!(backend.calls(), vec!["request_code", "verify_code"]);
    }

    #[tokio::test]
    async fn test_resend_blocked_for_exactly_the_cooldown_ticks() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;
        assert!(!wizard.can_resend());

        // Blocked resend issues no network call.
        assert_eq!(wizard.resend().await, SubmitOutcome::Ignored);
        assert_eq!(backend.calls(), vec!["request_code"]);

        for _ in 0..RESEND_COOLDOWN_SECS - 1 {
            wizard.tick();
            assert!(!wizard.can_resend());
        }
        wizard.tick();
        assert!(wizard.can_resend());

        assert_eq!(wizard.resend().await, SubmitOutcome::Resent);
        assert_eq!(wizard.cooldown_remaining(), RESEND_COOLDOWN_SECS);
        assert_eq!(backend.calls(), vec!["request_code", "request_code"]);
    }

    #[tokio::test]
    async fn test_back_keeps_entered_data() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;
        assert_eq!(wizard.step(), 2);

        wizard.back();
        assert_eq!(wizard.step(), 1);
        assert_eq!(wizard.form().email, "a@b.com");

        // Can't go back past the first step.
        wizard.back();
        assert_eq!(wizard.step(), 1);
    }

    #[tokio::test]
    async fn test_cancel_clears_everything_from_any_step() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "a@b.com");
        wizard.submit().await;
        wizard.set_field(fields::OTP, "12345");
        wizard.submit().await;

        wizard.cancel();
        assert!(wizard.is_idle());
        assert_eq!(wizard.form(), &WizardForm::default());
        assert!(wizard.errors().is_empty());
        assert!(wizard.error_message().is_none());
        assert_eq!(wizard.cooldown_remaining(), 0);
    }

    #[tokio::test]
    async fn test_submit_while_idle_is_ignored() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&PASSWORD_RESET, &backend);

        assert_eq!(wizard.submit().await, SubmitOutcome::Ignored);
        assert_eq!(wizard.resend().await, SubmitOutcome::Ignored);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signup_flow_completes_after_verification() {
        let backend = MockBackend::default();
        let mut wizard = Wizard::new(&SIGNUP_VERIFICATION, &backend);

        wizard.open();
        wizard.set_field(fields::EMAIL, "new@user.com");
        assert_eq!(wizard.submit().await, SubmitOutcome::Advanced);

        wizard.set_field(fields::OTP, "654321");
        assert_eq!(wizard.submit().await, SubmitOutcome::Completed);

        assert!(wizard.is_idle());
        // Two-step flow: the password endpoint is never touched.
        assert_eq!(backend.calls(), vec!["request_code", "verify_code"]);
    }
}
