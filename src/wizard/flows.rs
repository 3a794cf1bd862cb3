//! Flow tables and endpoint bindings for the verification wizard.
//!
//! Each flow is the same machine with a different step table and backend:
//! password reset runs request → verify → set-password, signup verification
//! and profile email change run request → verify.

use async_trait::async_trait;

use super::{FlowSpec, StepKind, VerificationBackend, WizardForm};
use crate::api::types::{Ack, SignupRequest};
use crate::api::{ApiClient, ApiError};

/// Forgot-password flow: collect email, verify OTP, set a new password.
pub static PASSWORD_RESET: FlowSpec = FlowSpec {
    name: "password-reset",
    steps: &[
        StepKind::RequestCode,
        StepKind::VerifyCode,
        StepKind::SetPassword,
    ],
    success_message: "Password reset successfully. Please sign in with your new password.",
};

/// Post-signup email verification: the signup request sends the code.
pub static SIGNUP_VERIFICATION: FlowSpec = FlowSpec {
    name: "signup-verification",
    steps: &[StepKind::RequestCode, StepKind::VerifyCode],
    success_message: "Email verified successfully. You can now sign in.",
};

/// Profile email change: code goes to the new address.
pub static EMAIL_CHANGE: FlowSpec = FlowSpec {
    name: "email-change",
    steps: &[StepKind::RequestCode, StepKind::VerifyCode],
    success_message: "Email updated successfully.",
};

/// Endpoint bindings for [`PASSWORD_RESET`]
pub struct PasswordResetBackend<'a> {
    api: &'a ApiClient,
}

impl<'a> PasswordResetBackend<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VerificationBackend for PasswordResetBackend<'_> {
    async fn request_code(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api.forgot_password(&form.email).await
    }

    async fn verify_code(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api.verify_otp(&form.email, form.otp.trim()).await
    }

    async fn set_password(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api
            .reset_password(&form.email, form.otp.trim(), &form.new_password)
            .await
    }
}

/// Endpoint bindings for [`SIGNUP_VERIFICATION`].
///
/// Requesting (and re-requesting) the code re-submits the pending signup;
/// the server treats a repeated signup for an unverified account as a resend.
pub struct SignupVerificationBackend<'a> {
    api: &'a ApiClient,
    pending: SignupRequest,
}

impl<'a> SignupVerificationBackend<'a> {
    pub fn new(api: &'a ApiClient, pending: SignupRequest) -> Self {
        Self { api, pending }
    }
}

#[async_trait]
impl VerificationBackend for SignupVerificationBackend<'_> {
    async fn request_code(&self, _form: &WizardForm) -> Result<Ack, ApiError> {
        self.api.signup(&self.pending).await
    }

    async fn verify_code(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api
            .verify_signup_otp(&self.pending.email, form.otp.trim())
            .await
    }
}

/// Endpoint bindings for [`EMAIL_CHANGE`]; the form's email field holds the
/// new address.
pub struct EmailChangeBackend<'a> {
    api: &'a ApiClient,
}

impl<'a> EmailChangeBackend<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VerificationBackend for EmailChangeBackend<'_> {
    async fn request_code(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api.request_email_change(&form.email).await
    }

    async fn verify_code(&self, form: &WizardForm) -> Result<Ack, ApiError> {
        self.api
            .verify_email_change(&form.email, form.otp.trim())
            .await
    }
}
