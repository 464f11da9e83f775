// Field checks for data entering the core. The portal forms ran the same
// checks client-side; repeating them here keeps the core safe to call directly.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{AttachmentPolicy, ACCEPTED_ATTACHMENT_TYPES};
use crate::models::{Attachment, NewRequest, PrescriptionOrder, ProfileUpdate, Regimen};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").unwrap());

static DATE_OF_BIRTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Please select at least one symptom")]
    NoSymptoms,
    #[error("Email is invalid")]
    InvalidEmail,
    #[error("Phone number is invalid")]
    InvalidPhone,
    #[error("Date of birth must be in YYYY-MM-DD format")]
    InvalidDateOfBirth,
    #[error("Attachment {name} is {size} bytes, limit is {limit}")]
    AttachmentTooLarge { name: String, size: u64, limit: u64 },
    #[error("Attachment {name} has unsupported type {mime_type}")]
    UnsupportedAttachmentType { name: String, mime_type: String },
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    require(email, "Email")?;
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Credentials are placeholders: any non-empty password is accepted.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    require(email, "Email")?;
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    Ok(())
}

pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), ValidationError> {
    validate_credentials(email, password)?;
    validate_email(email)?;
    require(name, "Name")
}

pub fn validate_profile(update: &ProfileUpdate) -> Result<(), ValidationError> {
    require(&update.name, "Name")?;
    validate_email(&update.email)?;

    if let Some(phone) = non_blank(&update.details.phone) {
        if !PHONE_PATTERN.is_match(phone) {
            return Err(ValidationError::InvalidPhone);
        }
    }
    if let Some(dob) = non_blank(&update.details.date_of_birth) {
        if !DATE_OF_BIRTH_PATTERN.is_match(dob) {
            return Err(ValidationError::InvalidDateOfBirth);
        }
    }
    Ok(())
}

pub fn validate_attachment(attachment: &Attachment, max_bytes: u64) -> Result<(), ValidationError> {
    if attachment.size > max_bytes {
        return Err(ValidationError::AttachmentTooLarge {
            name: attachment.name.clone(),
            size: attachment.size,
            limit: max_bytes,
        });
    }
    if !ACCEPTED_ATTACHMENT_TYPES.contains(&attachment.mime_type.as_str()) {
        return Err(ValidationError::UnsupportedAttachmentType {
            name: attachment.name.clone(),
            mime_type: attachment.mime_type.clone(),
        });
    }
    Ok(())
}

/// Check attachments only when the policy asks for upload limits.
pub fn validate_attachments(
    attachments: &[Attachment],
    policy: AttachmentPolicy,
) -> Result<(), ValidationError> {
    match policy {
        AttachmentPolicy::AcceptAsGiven => Ok(()),
        AttachmentPolicy::UploadLimits { max_bytes } => attachments
            .iter()
            .try_for_each(|attachment| validate_attachment(attachment, max_bytes)),
    }
}

/// Title and at least one symptom are mandatory. Duplicate symptoms are kept.
/// Attachments are checked separately, see `validate_attachments`.
pub fn validate_new_request(request: &NewRequest) -> Result<(), ValidationError> {
    require(&request.title, "Title")?;
    if request.symptoms.is_empty() {
        return Err(ValidationError::NoSymptoms);
    }
    Ok(())
}

/// Instructions may be left empty; everything else is required.
pub fn validate_regimen(regimen: &Regimen) -> Result<(), ValidationError> {
    require(&regimen.medication, "Medication")?;
    require(&regimen.dosage, "Dosage")?;
    require(&regimen.frequency, "Frequency")?;
    require(&regimen.duration, "Duration")
}

pub fn validate_order(order: &PrescriptionOrder) -> Result<(), ValidationError> {
    validate_regimen(&order.regimen)?;
    require(&order.doctor_name, "Doctor name")
}

/// A rejection must tell the patient why.
pub fn validate_rejection_reason(reason: &str) -> Result<(), ValidationError> {
    require(reason, "Rejection reason")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
