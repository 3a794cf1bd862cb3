//! QR tag provisioning and public contact resolution.
//!
//! A tag is a QR code encoding the public contact URL for a user-chosen
//! serial number. The image is rendered locally, embedded as a PNG data URL,
//! and uploaded together with the owner's contact details; anyone who scans
//! (or types in) the serial number can then resolve those details without an
//! account.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use std::io::Cursor;
use thiserror::Error;
use tracing::info;

use crate::api::types::{ContactDetails, TagRecord, UploadTagRequest};
use crate::api::{ApiClient, ApiError};
use crate::validation::{self, ErrorSet};

/// Shown when a public lookup finds nothing for the serial number
pub const NOT_FOUND_MESSAGE: &str = "No contact details found for this serial number.";

/// Pixels per QR module
const MODULE_PX: u32 = 8;

/// Quiet-zone border around the code, in modules
const QUIET_ZONE_MODULES: u32 = 4;

#[derive(Debug, Error)]
pub enum TagError {
    /// Local validation failed; no request was made
    #[error("tag details are invalid")]
    Invalid(ErrorSet),

    #[error("failed to render QR code")]
    Render(#[from] qrcode::types::QrError),

    #[error("failed to encode QR image")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a public serial-number lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(ContactDetails),
    NotFound,
}

/// The public contact URL a tag encodes
pub fn contact_url(site_url: &str, serial_number: &str) -> String {
    format!("{}/contact/{}", site_url.trim_end_matches('/'), serial_number)
}

/// Render the contact URL for a serial number as a PNG
pub fn render_contact_qr_png(site_url: &str, serial_number: &str) -> Result<Vec<u8>, TagError> {
    let url = contact_url(site_url, serial_number);
    let code = QrCode::new(url.as_bytes())?;

    let modules = code.width() as u32;
    let size = (modules + 2 * QUIET_ZONE_MODULES) * MODULE_PX;
    let mut pixels = GrayImage::from_pixel(size, size, Luma([0xFF]));

    for (index, color) in code.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let left = (index as u32 % modules + QUIET_ZONE_MODULES) * MODULE_PX;
        let top = (index as u32 / modules + QUIET_ZONE_MODULES) * MODULE_PX;
        for dy in 0..MODULE_PX {
            for dx in 0..MODULE_PX {
                pixels.put_pixel(left + dx, top + dy, Luma([0x00]));
            }
        }
    }

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(pixels).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Render the contact URL as an embeddable `data:image/png;base64,` URL
pub fn render_contact_qr_data_url(
    site_url: &str,
    serial_number: &str,
) -> Result<String, TagError> {
    let png = render_contact_qr_png(site_url, serial_number)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Owner-facing tag workflows plus the anonymous finder lookup.
pub struct TagService<'a> {
    api: &'a ApiClient,
    site_url: &'a str,
}

impl<'a> TagService<'a> {
    pub fn new(api: &'a ApiClient, site_url: &'a str) -> Self {
        Self { api, site_url }
    }

    /// Provision a new tag.
    ///
    /// Serial number, contact name, and contact email are required (email
    /// shape-checked) before anything is rendered or sent; a validation
    /// failure aborts locally. On success the returned record carries the
    /// server's canonical image URL.
    pub async fn provision(
        &self,
        serial_number: &str,
        contact: &ContactDetails,
    ) -> Result<TagRecord, TagError> {
        let errors = validate_tag(Some(serial_number), contact);
        if !errors.is_empty() {
            return Err(TagError::Invalid(errors));
        }

        let qr_image = render_contact_qr_data_url(self.site_url, serial_number.trim())?;
        let record = self
            .api
            .upload_tag(&UploadTagRequest {
                serial_number: serial_number.trim(),
                contact_details: contact,
                qr_image: &qr_image,
            })
            .await?;

        info!(serial_number = %record.serial_number, "tag provisioned");
        Ok(record)
    }

    /// Update the contact details on an existing tag.
    ///
    /// The serial number and rendered image are untouched.
    pub async fn update_contact(&self, contact: &ContactDetails) -> Result<TagRecord, TagError> {
        let errors = validate_tag(None, contact);
        if !errors.is_empty() {
            return Err(TagError::Invalid(errors));
        }

        Ok(self.api.update_tag_contact(contact).await?)
    }

    /// Fetch the signed-in user's tag, if provisioned
    pub async fn my_tag(&self) -> Result<Option<TagRecord>, TagError> {
        Ok(self.api.my_tag().await?)
    }

    /// Anonymous lookup by serial number.
    ///
    /// An unknown serial is a normal outcome, not an error.
    pub async fn resolve(&self, serial_number: &str) -> Result<LookupOutcome, TagError> {
        let serial_number = serial_number.trim();
        if serial_number.is_empty() {
            return Ok(LookupOutcome::NotFound);
        }

        match self.api.resolve_contact(serial_number).await? {
            Some(contact) => Ok(LookupOutcome::Found(contact)),
            None => Ok(LookupOutcome::NotFound),
        }
    }
}

/// Required-field checks shared by provisioning and contact updates
fn validate_tag(serial_number: Option<&str>, contact: &ContactDetails) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if let Some(serial) = serial_number {
        errors.record(
            "serial_number",
            validation::validate_required("Serial number", serial),
        );
    }
    errors.record("name", validation::validate_required("Name", &contact.name));
    errors.record("email", validation::validate_email(&contact.email));
    errors
}
