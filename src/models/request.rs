use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Account;
use super::enums::RequestStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub title: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub doctor_notes: Option<String>,
    pub prescription: Option<Prescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub request_id: Uuid,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub issued_at: DateTime<Utc>,
}

/// Input for creating a request. Patient identity is denormalized here
/// and never re-synced from the directory afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub title: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub attachments: Vec<Attachment>,
}

/// What the reviewing doctor prescribes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regimen {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
}

/// A regimen signed by a doctor. Id, back-reference and issue time are
/// assigned by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionOrder {
    #[serde(flatten)]
    pub regimen: Regimen,
    pub doctor_id: Uuid,
    pub doctor_name: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Status tab on the review dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(RequestStatus),
}

impl PrescriptionRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

impl PrescriptionOrder {
    pub fn signed_by(regimen: Regimen, doctor: &Account) -> Self {
        Self {
            regimen,
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
        }
    }
}

impl RequestStats {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a PrescriptionRequest>) -> Self {
        requests.into_iter().fold(Self::default(), |mut stats, req| {
            stats.total += 1;
            match req.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
            stats
        })
    }
}

impl StatusFilter {
    pub fn matches(&self, status: RequestStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}
