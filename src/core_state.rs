//! Portal state: the single store object behind the presentation layer.
//!
//! `PortalState` owns one `IdentityDirectory` and one `RequestLedger`,
//! each behind an `RwLock`. Share it with `Arc` when several tasks act
//! concurrently. Every request operation acts as the account signed in
//! when the call starts; with nobody signed in it fails with
//! `NotAuthenticated`. The acting account is then checked against
//! `authorization::check_access` before anything runs.
//!
//! Mutations await the configured simulated latency, then commit under the
//! write lock. The pending check runs inside the same critical section as
//! the transition, so concurrent reviews of one request produce exactly one
//! winner; the others get `InvalidTransition`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::authorization::{check_access, Action};
use crate::config::PortalConfig;
use crate::directory::{DirectoryError, IdentityDirectory};
use crate::ledger::{LedgerError, RequestLedger};
use crate::models::{
    Account, Attachment, NewRequest, PrescriptionOrder, PrescriptionRequest, ProfileUpdate,
    Regimen, RequestStats, ReviewDecision, Role, StatusFilter,
};
use crate::validation::{self, ValidationError};

// ═══════════════════════════════════════════════════════════
// PortalState
// ═══════════════════════════════════════════════════════════

pub struct PortalState {
    directory: RwLock<IdentityDirectory>,
    ledger: RwLock<RequestLedger>,
    config: PortalConfig,
}

impl PortalState {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            directory: RwLock::new(IdentityDirectory::new(config.duplicate_emails)),
            ledger: RwLock::new(RequestLedger::new(config.attachments)),
            config,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    // ── Lock access ─────────────────────────────────────────

    pub fn read_directory(&self) -> Result<RwLockReadGuard<'_, IdentityDirectory>, CoreError> {
        self.directory.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_directory(&self) -> Result<RwLockWriteGuard<'_, IdentityDirectory>, CoreError> {
        self.directory.write().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn read_ledger(&self) -> Result<RwLockReadGuard<'_, RequestLedger>, CoreError> {
        self.ledger.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_ledger(&self) -> Result<RwLockWriteGuard<'_, RequestLedger>, CoreError> {
        self.ledger.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Session ─────────────────────────────────────────────

    /// Sign in by email. The password is required but not checked.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, CoreError> {
        simulate_latency(self.config.auth_latency).await;
        let result = self.write_directory()?.authenticate(email, password);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Sign-in refused");
        }
        Ok(result?)
    }

    /// Create an account and sign it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Account, CoreError> {
        simulate_latency(self.config.auth_latency).await;
        Ok(self.write_directory()?.register(email, password, name, role)?)
    }

    pub fn current_session(&self) -> Result<Option<Account>, CoreError> {
        Ok(self.read_directory()?.current_session().cloned())
    }

    /// The signed-in account, or `NotAuthenticated`.
    pub fn require_session(&self) -> Result<Account, CoreError> {
        self.current_session()?.ok_or(CoreError::NotAuthenticated)
    }

    pub fn end_session(&self) -> Result<(), CoreError> {
        self.write_directory()?.end_session();
        Ok(())
    }

    /// Edit the signed-in account's profile. Requests already filed keep
    /// the name and email they were created with.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Account, CoreError> {
        let actor = self.require_session()?;
        simulate_latency(self.config.request_latency).await;
        Ok(self.write_directory()?.update_profile(&actor.id, update)?)
    }

    // ── Patient operations ──────────────────────────────────

    /// File a request as the signed-in patient. Name and email are copied
    /// from the patient's account at this moment.
    pub async fn create_request(
        &self,
        title: &str,
        description: &str,
        symptoms: Vec<String>,
        attachments: Vec<Attachment>,
    ) -> Result<PrescriptionRequest, CoreError> {
        let patient = self.require_session()?;
        authorize(&patient, Action::CreateRequest, Some(&patient.id))?;

        let new = NewRequest {
            patient_id: patient.id,
            patient_name: patient.name,
            patient_email: patient.email,
            title: title.to_string(),
            description: description.to_string(),
            symptoms,
            attachments,
        };
        validation::validate_new_request(&new)?;
        validation::validate_attachments(&new.attachments, self.config.attachments)?;

        simulate_latency(self.config.request_latency).await;
        Ok(self.write_ledger()?.create(new)?)
    }

    /// One request, if the actor owns it or reviews requests. A patient
    /// asking for a request that is not theirs gets `Forbidden` whether or
    /// not it exists.
    pub fn get_request(&self, request_id: &Uuid) -> Result<PrescriptionRequest, CoreError> {
        let actor = self.require_session()?;
        let request = self.read_ledger()?.get_by_id(request_id).cloned();
        authorize(&actor, Action::ViewRequest, request.as_ref().map(|r| &r.patient_id))?;
        Ok(request.ok_or(LedgerError::NotFound(*request_id))?)
    }

    /// A patient's requests, newest first.
    pub fn requests_for_patient(
        &self,
        patient_id: &Uuid,
    ) -> Result<Vec<PrescriptionRequest>, CoreError> {
        let actor = self.require_session()?;
        authorize(&actor, Action::ListPatientRequests, Some(patient_id))?;
        Ok(self
            .read_ledger()?
            .get_by_patient(patient_id)
            .into_iter()
            .cloned()
            .collect())
    }

    // ── Doctor operations ───────────────────────────────────

    /// The review queue, optionally narrowed to one status.
    pub fn list_requests(&self, filter: StatusFilter) -> Result<Vec<PrescriptionRequest>, CoreError> {
        let actor = self.require_session()?;
        authorize(&actor, Action::ListAllRequests, None)?;
        Ok(self
            .read_ledger()?
            .by_status(filter)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Dashboard counters: the whole ledger for doctors, own requests for
    /// patients.
    pub fn dashboard_stats(&self) -> Result<RequestStats, CoreError> {
        let actor = self.require_session()?;
        match actor.role {
            Role::Doctor => {
                authorize(&actor, Action::ListAllRequests, None)?;
                Ok(self.read_ledger()?.stats())
            }
            Role::Patient => {
                authorize(&actor, Action::ListPatientRequests, Some(&actor.id))?;
                Ok(self.read_ledger()?.stats_for_patient(&actor.id))
            }
        }
    }

    /// Prescribe, approve and record notes in a single transition.
    pub async fn approve(
        &self,
        request_id: &Uuid,
        regimen: Regimen,
        notes: Option<String>,
    ) -> Result<PrescriptionRequest, CoreError> {
        let doctor = self.reviewer(request_id)?;
        let order = PrescriptionOrder::signed_by(regimen, &doctor);
        validation::validate_order(&order)?;

        simulate_latency(self.config.request_latency).await;
        Ok(self.write_ledger()?.approve(request_id, order, notes)?)
    }

    /// Reject with a reason shown to the patient.
    pub async fn reject(
        &self,
        request_id: &Uuid,
        reason: &str,
    ) -> Result<PrescriptionRequest, CoreError> {
        self.reviewer(request_id)?;
        validation::validate_rejection_reason(reason)?;

        simulate_latency(self.config.request_latency).await;
        Ok(self.write_ledger()?.set_status(
            request_id,
            ReviewDecision::Rejected,
            Some(reason.to_string()),
        )?)
    }

    /// Decide without prescribing. `Approved` here leaves the request
    /// approved with no prescription attached.
    pub async fn set_status(
        &self,
        request_id: &Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<PrescriptionRequest, CoreError> {
        self.reviewer(request_id)?;
        simulate_latency(self.config.request_latency).await;
        Ok(self
            .write_ledger()?
            .set_status(request_id, decision, notes)?)
    }

    /// Prescribe and approve, leaving notes untouched.
    pub async fn issue_prescription(
        &self,
        request_id: &Uuid,
        regimen: Regimen,
    ) -> Result<PrescriptionRequest, CoreError> {
        let doctor = self.reviewer(request_id)?;
        let order = PrescriptionOrder::signed_by(regimen, &doctor);
        validation::validate_order(&order)?;

        simulate_latency(self.config.request_latency).await;
        Ok(self
            .write_ledger()?
            .issue_prescription(request_id, order)?)
    }

    // ── Helpers ─────────────────────────────────────────────

    /// The signed-in doctor, once `request_id` is known to exist. Role is
    /// checked before the lookup.
    fn reviewer(&self, request_id: &Uuid) -> Result<Account, CoreError> {
        let actor = self.require_session()?;
        authorize(&actor, Action::ReviewRequest, None)?;
        if self.read_ledger()?.get_by_id(request_id).is_none() {
            return Err(LedgerError::NotFound(*request_id).into());
        }
        Ok(actor)
    }
}

impl Default for PortalState {
    fn default() -> Self {
        Self::new(PortalConfig::default())
    }
}

fn authorize(actor: &Account, action: Action, owner: Option<&Uuid>) -> Result<(), CoreError> {
    let decision = check_access(actor, action, owner);
    if decision.allowed {
        return Ok(());
    }
    tracing::warn!(actor_id = %actor.id, role = %actor.role, %action, "Access denied");
    Err(CoreError::Forbidden {
        actor: actor.id,
        action,
    })
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Account {actor} is not permitted to {action}")]
    Forbidden { actor: Uuid, action: Action },
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Directory(e) => e.is_not_found(),
            Self::Ledger(e) => e.is_not_found(),
            _ => false,
        }
    }

    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::Ledger(LedgerError::InvalidTransition { .. }))
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Directory(DirectoryError::Validation(_))
                | Self::Ledger(LedgerError::Validation(_))
        )
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
