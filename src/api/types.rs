//! Request and response types for the TagLink API.
//!
//! The remote service speaks camelCase JSON; everything here renames
//! accordingly so the Rust side stays snake_case.

use serde::{Deserialize, Serialize};

/// A signed-in user, as returned by the profile and verify-token endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Generic acknowledgement envelope for mutation endpoints.
///
/// The API sometimes reports a logical failure inside a 200 response, so
/// `success` must be checked even when the HTTP status is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub new_password: &'a str,
}

/// Verification result from the session check endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVerification {
    #[serde(default)]
    pub authenticated: bool,
    pub user: Option<UserProfile>,
}

/// Partial profile update; absent fields are left unchanged server-side
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest<'a> {
    pub new_email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailChangeRequest<'a> {
    pub new_email: &'a str,
    pub otp: &'a str,
}

/// Contact metadata attached to a QR tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A provisioned QR tag owned by the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub serial_number: String,
    pub contact_details: ContactDetails,
    pub qr_image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTagRequest<'a> {
    pub serial_number: &'a str,
    pub contact_details: &'a ContactDetails,
    /// Locally rendered QR image as a `data:image/png;base64,` URL
    pub qr_image: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest<'a> {
    pub data: &'a str,
}

/// Server-side QR rendering result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQr {
    pub qr_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// Marketing-page contact form submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_defaults_success_when_absent() {
        let ack: Ack = serde_json::from_str(r#"{"message":"OTP sent"}"#).unwrap();
        assert!(ack.success);
        assert_eq!(ack.message.as_deref(), Some("OTP sent"));
    }

    #[test]
    fn test_ack_reports_logical_failure() {
        let ack: Ack = serde_json::from_str(r#"{"success":false,"message":"Invalid OTP"}"#).unwrap();
        assert!(!ack.success);
    }

    #[test]
    fn test_tag_record_uses_camel_case_wire_names() {
        let json = r#"{
            "serialNumber": "TL-1042",
            "contactDetails": {"name": "Ada", "email": "ada@example.com"},
            "qrImageUrl": "https://cdn.example.com/qr/TL-1042.png"
        }"#;
        let tag: TagRecord = serde_json::from_str(json).unwrap();
        assert_eq!(tag.serial_number, "TL-1042");
        assert_eq!(tag.contact_details.name, "Ada");
        assert!(tag.contact_details.number.is_none());

        let out = serde_json::to_value(&tag).unwrap();
        assert!(out.get("qrImageUrl").is_some());
        assert!(out.get("qr_image_url").is_none());
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            number: Some("+14155552671".to_string()),
            ..Default::default()
        };
        let out = serde_json::to_value(&update).unwrap();
        assert!(out.get("name").is_none());
        assert!(out.get("number").is_some());
    }
}
