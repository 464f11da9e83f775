//! Request ledger: prescription requests and their review lifecycle.
//!
//! Requests are kept newest-first. Each one starts `pending` and moves
//! exactly once to `approved` or `rejected`; a terminal request refuses
//! every further transition with `InvalidTransition`.
//!
//! Transitions:
//! - `approve`            → approved, prescription and notes set together
//! - `issue_prescription` → approved, prescription set, notes untouched
//! - `set_status`         → approved or rejected, notes replaced, no prescription
//!
//! `set_status(Approved)` is the one path that leaves an approved request
//! without a prescription. It is kept for callers that approve without
//! prescribing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::AttachmentPolicy;
use crate::models::{
    NewRequest, Prescription, PrescriptionOrder, PrescriptionRequest, RequestStats,
    RequestStatus, ReviewDecision, StatusFilter,
};
use crate::validation::{self, ValidationError};

// ═══════════════════════════════════════════════════════════
// RequestLedger
// ═══════════════════════════════════════════════════════════

pub struct RequestLedger {
    /// Newest first.
    requests: Vec<PrescriptionRequest>,
    attachments: AttachmentPolicy,
}

impl RequestLedger {
    pub fn new(attachments: AttachmentPolicy) -> Self {
        Self {
            requests: Vec::new(),
            attachments,
        }
    }

    // ── Creation ─────────────────────────────────────────

    /// File a new pending request and put it at the head of the ledger.
    pub fn create(&mut self, new: NewRequest) -> Result<PrescriptionRequest, LedgerError> {
        validation::validate_new_request(&new)?;
        validation::validate_attachments(&new.attachments, self.attachments)?;

        let now = Utc::now();
        let request = PrescriptionRequest {
            id: self.fresh_id(),
            patient_id: new.patient_id,
            patient_name: new.patient_name,
            patient_email: new.patient_email,
            title: new.title.trim().to_string(),
            description: new.description,
            symptoms: new.symptoms,
            attachments: new.attachments,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
            doctor_notes: None,
            prescription: None,
        };
        self.requests.insert(0, request.clone());

        tracing::info!(
            request_id = %request.id,
            patient_id = %request.patient_id,
            symptoms = request.symptoms.len(),
            attachments = request.attachments.len(),
            "Prescription request created"
        );
        Ok(request)
    }

    /// Append an existing request at the tail (oldest end) of the ledger.
    pub fn insert(&mut self, request: PrescriptionRequest) -> Result<(), LedgerError> {
        if self.get_by_id(&request.id).is_some() {
            return Err(LedgerError::DuplicateId(request.id));
        }
        self.requests.push(request);
        Ok(())
    }

    // ── Transitions ──────────────────────────────────────

    /// Decide a pending request without issuing a prescription.
    /// `notes` replaces any previous notes; `None` clears them.
    pub fn set_status(
        &mut self,
        id: &Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<PrescriptionRequest, LedgerError> {
        let to = decision.status();
        let request = self.pending_mut(id, to)?;

        request.status = to;
        request.doctor_notes = clean_notes(notes);
        request.updated_at = advance(request.updated_at);

        tracing::info!(request_id = %id, status = %to, "Request status set");
        Ok(request.clone())
    }

    /// Attach a prescription and approve. Leaves `doctor_notes` as it was.
    pub fn issue_prescription(
        &mut self,
        id: &Uuid,
        order: PrescriptionOrder,
    ) -> Result<PrescriptionRequest, LedgerError> {
        self.commit_approval(id, order, None)
    }

    /// Attach a prescription, approve and record notes in one transition.
    pub fn approve(
        &mut self,
        id: &Uuid,
        order: PrescriptionOrder,
        notes: Option<String>,
    ) -> Result<PrescriptionRequest, LedgerError> {
        self.commit_approval(id, order, Some(clean_notes(notes)))
    }

    fn commit_approval(
        &mut self,
        id: &Uuid,
        order: PrescriptionOrder,
        notes: Option<Option<String>>,
    ) -> Result<PrescriptionRequest, LedgerError> {
        validation::validate_order(&order)?;
        let request = self.pending_mut(id, RequestStatus::Approved)?;

        let now = advance(request.updated_at);
        let regimen = order.regimen;
        request.prescription = Some(Prescription {
            id: Uuid::new_v4(),
            request_id: *id,
            medication: regimen.medication,
            dosage: regimen.dosage,
            frequency: regimen.frequency,
            duration: regimen.duration,
            instructions: regimen.instructions,
            doctor_id: order.doctor_id,
            doctor_name: order.doctor_name,
            issued_at: now,
        });
        request.status = RequestStatus::Approved;
        if let Some(notes) = notes {
            request.doctor_notes = notes;
        }
        request.updated_at = now;

        tracing::info!(
            request_id = %id,
            doctor_id = %order.doctor_id,
            "Prescription issued, request approved"
        );
        Ok(request.clone())
    }

    /// Look up a request that may still change state.
    fn pending_mut(
        &mut self,
        id: &Uuid,
        to: RequestStatus,
    ) -> Result<&mut PrescriptionRequest, LedgerError> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(LedgerError::NotFound(*id))?;
        if request.status.is_terminal() {
            tracing::warn!(request_id = %id, from = %request.status, to = %to, "Refused transition on decided request");
            return Err(LedgerError::InvalidTransition {
                id: *id,
                from: request.status,
                to,
            });
        }
        Ok(request)
    }

    // ── Queries ──────────────────────────────────────────

    pub fn get_by_id(&self, id: &Uuid) -> Option<&PrescriptionRequest> {
        self.requests.iter().find(|r| &r.id == id)
    }

    /// A patient's requests in ledger order (newest first).
    pub fn get_by_patient(&self, patient_id: &Uuid) -> Vec<&PrescriptionRequest> {
        self.requests
            .iter()
            .filter(|r| &r.patient_id == patient_id)
            .collect()
    }

    pub fn by_status(&self, filter: StatusFilter) -> Vec<&PrescriptionRequest> {
        self.requests
            .iter()
            .filter(|r| filter.matches(r.status))
            .collect()
    }

    pub fn all(&self) -> &[PrescriptionRequest] {
        &self.requests
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats::tally(&self.requests)
    }

    pub fn stats_for_patient(&self, patient_id: &Uuid) -> RequestStats {
        RequestStats::tally(self.get_by_patient(patient_id))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if self.get_by_id(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new(AttachmentPolicy::AcceptAsGiven)
    }
}

/// Next `updated_at`: now, but strictly after `previous` even when the
/// clock has not moved or has stepped back.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Prescription request {0} not found")]
    NotFound(Uuid),
    #[error("Request {id} is already {from}, cannot move to {to}")]
    InvalidTransition {
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("Request {0} already exists")]
    DuplicateId(Uuid),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
