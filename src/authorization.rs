//! Role-based access to the request ledger.
//!
//! Rule cascade, checked in order, default-deny:
//! 1. Doctor reading or reviewing any request → ALLOW (reviewer)
//! 2. Patient creating, reading or listing their own requests → ALLOW (owner)
//! 3. Default → DENY
//!
//! Doctors never file requests. Patients never review, and never see
//! another patient's requests or the whole ledger.

use uuid::Uuid;

use crate::models::{Account, Role};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Operations on the ledger that need a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRequest,
    ViewRequest,
    /// List one patient's requests (and their counters).
    ListPatientRequests,
    /// List every request (and the global counters).
    ListAllRequests,
    /// Approve, reject or issue a prescription.
    ReviewRequest,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateRequest => "create_request",
            Self::ViewRequest => "view_request",
            Self::ListPatientRequests => "list_patient_requests",
            Self::ListAllRequests => "list_all_requests",
            Self::ReviewRequest => "review_request",
        }
    }

    fn is_reviewer_action(self) -> bool {
        matches!(
            self,
            Self::ViewRequest | Self::ListPatientRequests | Self::ListAllRequests | Self::ReviewRequest
        )
    }

    fn is_owner_action(self) -> bool {
        matches!(
            self,
            Self::CreateRequest | Self::ViewRequest | Self::ListPatientRequests
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why access was granted (or denied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// Doctor acting on the review queue.
    Reviewer,
    /// Patient acting on their own requests.
    Owner,
    /// No matching rule.
    Denied,
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            reason: AccessReason::Denied,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Authorization check
// ═══════════════════════════════════════════════════════════

/// Decide whether `actor` may perform `action`.
///
/// `owner` is the patient the action concerns: the patient a request is
/// filed for, the owner of the request being read or reviewed, or the
/// patient whose list is requested. `None` for whole-ledger actions.
pub fn check_access(actor: &Account, action: Action, owner: Option<&Uuid>) -> AccessDecision {
    match actor.role {
        // Rule 1: Reviewer
        Role::Doctor if action.is_reviewer_action() => AccessDecision::allow(AccessReason::Reviewer),
        // Rule 2: Own requests
        Role::Patient if action.is_owner_action() && owner == Some(&actor.id) => {
            AccessDecision::allow(AccessReason::Owner)
        }
        // Rule 3: Default deny
        _ => AccessDecision::deny(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
