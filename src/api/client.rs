//! HTTP client adapter for the TagLink API.

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use super::types::{
    Ack, ContactDetails, ContactMessage, EmailChangeRequest, EmailRequest, GenerateQrRequest,
    GeneratedQr, LoginRequest, LoginResponse, NewPost, OtpRequest, Post, ProfileUpdate,
    ResetPasswordRequest, SessionVerification, SignupRequest, TagRecord, UploadTagRequest,
    UserProfile, VerifyEmailChangeRequest,
};

/// Client for the TagLink API.
///
/// Holds a cookie store so the session credential set by login (and by a
/// completed password reset) rides along on every subsequent request.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the given API base URL.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("taglink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        response.json().await.map_err(ApiError::Decode)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::decode(response).await
    }

    /// GET where a 404 is a normal outcome rather than a failure
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(ApiError::Network)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::decode(response).await.map(Some)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::decode(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::decode(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .http
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::decode(response).await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .http
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Network)?;
        Self::decode(response).await
    }

    /// Promote an in-band `success: false` to a rejection
    fn confirmed(ack: Ack) -> ApiResult<Ack> {
        if ack.success {
            Ok(ack)
        } else {
            Err(ApiError::Rejected {
                status: StatusCode::OK,
                message: ack.message.unwrap_or_default(),
            })
        }
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Sign in. On success the server sets the session cookie on this client.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/api/users/login", &request).await?;
        Ok(response.user)
    }

    /// Sign out and drop the server-side session.
    pub async fn logout(&self) -> ApiResult<Ack> {
        let ack = self.post_empty("/api/users/logout").await?;
        Self::confirmed(ack)
    }

    /// Submit (or re-submit, for an OTP resend) the signup request.
    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<Ack> {
        let ack = self.post("/api/users/signup", request).await?;
        Self::confirmed(ack)
    }

    /// Verify the signup OTP, activating the account.
    pub async fn verify_signup_otp(&self, email: &str, otp: &str) -> ApiResult<Ack> {
        let ack = self
            .post("/api/users/verify-signup-otp", &OtpRequest { email, otp })
            .await?;
        Self::confirmed(ack)
    }

    /// Request a password-reset OTP for the given email.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<Ack> {
        let ack = self
            .post("/api/users/forgot-password", &EmailRequest { email })
            .await?;
        Self::confirmed(ack)
    }

    /// Verify a password-reset OTP.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResult<Ack> {
        let ack = self
            .post("/api/users/verify-otp", &OtpRequest { email, otp })
            .await?;
        Self::confirmed(ack)
    }

    /// Set a new password after a verified reset OTP.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> ApiResult<Ack> {
        let request = ResetPasswordRequest {
            email,
            otp,
            new_password,
        };
        let ack = self.post("/api/users/reset-password", &request).await?;
        Self::confirmed(ack)
    }

    /// Check whether this client currently holds a valid session.
    pub async fn verify_token(&self) -> ApiResult<SessionVerification> {
        self.get("/api/users/verify-token").await
    }

    // -------------------------------------------------------------------------
    // Profile
    // -------------------------------------------------------------------------

    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.get("/api/users/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        self.patch("/api/users/profile", update).await
    }

    /// Request an email change; the server sends an OTP to the new address.
    pub async fn request_email_change(&self, new_email: &str) -> ApiResult<Ack> {
        let ack = self
            .post("/api/users/profile/email", &EmailChangeRequest { new_email })
            .await?;
        Self::confirmed(ack)
    }

    /// Confirm an email change with the OTP sent to the new address.
    pub async fn verify_email_change(&self, new_email: &str, otp: &str) -> ApiResult<Ack> {
        let request = VerifyEmailChangeRequest { new_email, otp };
        let ack = self
            .post("/api/users/profile/verify-email-otp", &request)
            .await?;
        Self::confirmed(ack)
    }

    // -------------------------------------------------------------------------
    // QR tags
    // -------------------------------------------------------------------------

    /// Fetch the signed-in user's tag, if one has been provisioned.
    pub async fn my_tag(&self) -> ApiResult<Option<TagRecord>> {
        self.get_optional("/api/qr/my-qr").await
    }

    /// Upload a locally rendered QR image together with its contact metadata.
    pub async fn upload_tag(&self, request: &UploadTagRequest<'_>) -> ApiResult<TagRecord> {
        self.post("/api/qr/upload-qr", request).await
    }

    /// Update the contact metadata of an existing tag. Does not touch the
    /// serial number or the rendered image.
    pub async fn update_tag_contact(&self, contact: &ContactDetails) -> ApiResult<TagRecord> {
        self.put("/api/qr/update-contact", contact).await
    }

    /// Public, unauthenticated lookup of contact details by serial number.
    pub async fn resolve_contact(&self, serial_number: &str) -> ApiResult<Option<ContactDetails>> {
        let path = format!("/api/qr/contact/{}", serial_number);
        let found: Option<ContactLookupResponse> = self.get_optional(&path).await?;
        Ok(found.and_then(|lookup| {
            if lookup.success {
                lookup.contact_details
            } else {
                None
            }
        }))
    }

    /// Ask the server to render a QR image for arbitrary data.
    pub async fn generate_qr(&self, data: &str) -> ApiResult<GeneratedQr> {
        self.post("/api/qr/generate", &GenerateQrRequest { data }).await
    }

    // -------------------------------------------------------------------------
    // Posts & contact form
    // -------------------------------------------------------------------------

    pub async fn posts(&self) -> ApiResult<Vec<Post>> {
        self.get("/api/posts").await
    }

    pub async fn create_post(&self, post: &NewPost<'_>) -> ApiResult<Post> {
        self.post("/api/posts", post).await
    }

    /// Submit the marketing-page contact form.
    pub async fn send_contact_message(&self, message: &ContactMessage<'_>) -> ApiResult<Ack> {
        let ack = self.post("/api/contact", message).await?;
        Self::confirmed(ack)
    }
}

/// Lookup responses carry the not-found signal in-band on some deployments
/// (`success: false`) and as a 404 on others; both map to `None`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactLookupResponse {
    #[serde(default = "lookup_success_default")]
    success: bool,
    contact_details: Option<ContactDetails>,
}

fn lookup_success_default() -> bool {
    true
}
