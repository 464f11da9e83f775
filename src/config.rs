use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Rxdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulated backend latency for sign-in and registration.
pub const DEFAULT_AUTH_LATENCY_MS: u64 = 1000;

/// Simulated backend latency for request creation and review.
pub const DEFAULT_REQUEST_LATENCY_MS: u64 = 500;

/// Upload limit per attachment: 10 MB.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted by the upload form (PDF, DOC, DOCX, JPG, PNG).
pub const ACCEPTED_ATTACHMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "rxdesk=info"
}

/// What `register` and `update_profile` do with an email that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateEmailPolicy {
    /// Refuse with `DirectoryError::DuplicateEmail`.
    Reject,
    /// Accept silently. Lookup by email then resolves to the first account.
    Allow,
}

/// Whether `create` checks attachments against the upload form's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentPolicy {
    /// Store attachment records exactly as the file-handling layer built them.
    AcceptAsGiven,
    /// Refuse files over `max_bytes` or outside `ACCEPTED_ATTACHMENT_TYPES`.
    UploadLimits { max_bytes: u64 },
}

impl AttachmentPolicy {
    /// The upload form's own limits: 10 MB, PDF/DOC/DOCX/JPG/PNG.
    pub fn upload_form() -> Self {
        Self::UploadLimits {
            max_bytes: MAX_ATTACHMENT_BYTES,
        }
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::AcceptAsGiven
    }
}

/// Runtime configuration of a `PortalState`.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Delay awaited before `authenticate`/`register` commit.
    pub auth_latency: Duration,
    /// Delay awaited before ledger mutations commit.
    pub request_latency: Duration,
    pub duplicate_emails: DuplicateEmailPolicy,
    pub attachments: AttachmentPolicy,
}

impl PortalConfig {
    /// No simulated latency. Used by tests and by callers embedding the
    /// core behind a real transport.
    pub fn immediate() -> Self {
        Self {
            auth_latency: Duration::ZERO,
            request_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            auth_latency: Duration::from_millis(DEFAULT_AUTH_LATENCY_MS),
            request_latency: Duration::from_millis(DEFAULT_REQUEST_LATENCY_MS),
            duplicate_emails: DuplicateEmailPolicy::Reject,
            attachments: AttachmentPolicy::AcceptAsGiven,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_rxdesk() {
        assert_eq!(APP_NAME, "Rxdesk");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_latencies_match_backend_simulation() {
        let config = PortalConfig::default();
        assert_eq!(config.auth_latency, Duration::from_millis(1000));
        assert_eq!(config.request_latency, Duration::from_millis(500));
        assert_eq!(config.duplicate_emails, DuplicateEmailPolicy::Reject);
    }

    #[test]
    fn immediate_config_keeps_policies() {
        let config = PortalConfig::immediate();
        assert!(config.auth_latency.is_zero());
        assert!(config.request_latency.is_zero());
        assert_eq!(config.attachments, AttachmentPolicy::AcceptAsGiven);
    }

    #[test]
    fn attachments_accepted_as_given_by_default() {
        assert_eq!(PortalConfig::default().attachments, AttachmentPolicy::AcceptAsGiven);
        assert_eq!(
            AttachmentPolicy::upload_form(),
            AttachmentPolicy::UploadLimits { max_bytes: MAX_ATTACHMENT_BYTES }
        );
    }

    #[test]
    fn accepted_types_cover_upload_form() {
        assert!(ACCEPTED_ATTACHMENT_TYPES.contains(&"application/pdf"));
        assert!(ACCEPTED_ATTACHMENT_TYPES.contains(&"image/png"));
        assert!(!ACCEPTED_ATTACHMENT_TYPES.contains(&"application/zip"));
    }
}
