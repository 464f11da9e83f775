//! Identity directory: registered accounts and the active session.
//!
//! Accounts live in memory in registration order and are never deleted.
//! The directory also tracks which account is signed in (at most one);
//! `authenticate` and `register` bind it, `end_session` clears it.
//!
//! Passwords are placeholders. They must be non-empty but are not stored
//! or compared.

use chrono::Utc;
use uuid::Uuid;

use crate::config::DuplicateEmailPolicy;
use crate::models::{Account, ProfileDetails, ProfileUpdate, Role};
use crate::validation::{self, ValidationError};

// ═══════════════════════════════════════════════════════════
// IdentityDirectory
// ═══════════════════════════════════════════════════════════

pub struct IdentityDirectory {
    /// All registered accounts, oldest first.
    accounts: Vec<Account>,
    /// The signed-in account, if any.
    active_id: Option<Uuid>,
    duplicate_emails: DuplicateEmailPolicy,
}

impl IdentityDirectory {
    /// Create an empty directory.
    pub fn new(duplicate_emails: DuplicateEmailPolicy) -> Self {
        Self {
            accounts: Vec::new(),
            active_id: None,
            duplicate_emails,
        }
    }

    // ── Session ──────────────────────────────────────────

    /// Sign in by exact, case-sensitive email match.
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<Account, DirectoryError> {
        validation::validate_credentials(email, password)?;

        let account = self
            .find_by_email(email)
            .cloned()
            .ok_or_else(|| DirectoryError::EmailNotFound(email.to_string()))?;
        self.active_id = Some(account.id);

        tracing::info!(account_id = %account.id, role = %account.role, "Signed in");
        Ok(account)
    }

    /// Create an account and sign it in.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Account, DirectoryError> {
        validation::validate_registration(email, password, name)?;
        self.check_email_available(email, None)?;

        let account = Account {
            id: self.fresh_id(),
            email: email.to_string(),
            name: name.trim().to_string(),
            role,
            created_at: Utc::now(),
            details: ProfileDetails::default(),
        };
        self.accounts.push(account.clone());
        self.active_id = Some(account.id);

        tracing::info!(account_id = %account.id, role = %role, "Account registered");
        Ok(account)
    }

    /// The signed-in account.
    pub fn current_session(&self) -> Option<&Account> {
        self.active_id.and_then(|id| self.get(&id))
    }

    /// Sign out. Safe when already anonymous.
    pub fn end_session(&mut self) {
        if let Some(id) = self.active_id.take() {
            tracing::info!(account_id = %id, "Signed out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.active_id.is_some()
    }

    // ── Accounts ─────────────────────────────────────────

    pub fn get(&self, id: &Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    /// First account registered with this email.
    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email == email)
    }

    /// Replace name, email and profile details.
    ///
    /// Requests already filed keep the patient name and email they were
    /// created with.
    pub fn update_profile(
        &mut self,
        id: &Uuid,
        update: ProfileUpdate,
    ) -> Result<Account, DirectoryError> {
        validation::validate_profile(&update)?;
        if self.get(id).is_none() {
            return Err(DirectoryError::AccountNotFound(*id));
        }
        self.check_email_available(&update.email, Some(id))?;

        let account = self
            .accounts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or(DirectoryError::AccountNotFound(*id))?;
        account.name = update.name.trim().to_string();
        account.email = update.email;
        account.details = update.details;

        tracing::info!(account_id = %id, "Profile updated");
        Ok(account.clone())
    }

    /// Add a pre-built account without signing it in.
    pub fn insert(&mut self, account: Account) -> Result<(), DirectoryError> {
        self.check_email_available(&account.email, None)?;
        self.accounts.push(account);
        Ok(())
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn check_email_available(&self, email: &str, owner: Option<&Uuid>) -> Result<(), DirectoryError> {
        if self.duplicate_emails == DuplicateEmailPolicy::Allow {
            return Ok(());
        }
        let taken = self
            .accounts
            .iter()
            .any(|a| a.email == email && Some(&a.id) != owner);
        if taken {
            return Err(DirectoryError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }

    fn fresh_id(&self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

impl Default for IdentityDirectory {
    fn default() -> Self {
        Self::new(DuplicateEmailPolicy::Reject)
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Invalid email or password")]
    EmailNotFound(String),
    #[error("Account {0} not found")]
    AccountNotFound(Uuid),
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DirectoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EmailNotFound(_) | Self::AccountNotFound(_))
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with_patient() -> (IdentityDirectory, Account) {
        let mut dir = IdentityDirectory::default();
        let account = dir
            .register("patient@demo.com", "secret", "Anna Smith", Role::Patient)
            .unwrap();
        dir.end_session();
        (dir, account)
    }

    #[test]
    fn new_directory_is_anonymous() {
        let dir = IdentityDirectory::default();
        assert!(dir.is_empty());
        assert!(!dir.is_authenticated());
        assert!(dir.current_session().is_none());
    }

    #[test]
    fn register_creates_and_signs_in() {
        let mut dir = IdentityDirectory::default();
        let account = dir
            .register("doctor@demo.com", "pw", "Dr. John Doe", Role::Doctor)
            .unwrap();

        assert_eq!(dir.len(), 1);
        assert_eq!(account.role, Role::Doctor);
        assert_eq!(dir.current_session().unwrap().id, account.id);
    }

    #[test]
    fn registered_ids_are_distinct() {
        let mut dir = IdentityDirectory::default();
        let a = dir.register("a@example.com", "pw", "A", Role::Patient).unwrap();
        let b = dir.register("b@example.com", "pw", "B", Role::Patient).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn authenticate_known_email() {
        let (mut dir, account) = directory_with_patient();

        let signed_in = dir.authenticate("patient@demo.com", "anything").unwrap();
        assert_eq!(signed_in.id, account.id);
        assert_eq!(dir.current_session().unwrap().id, account.id);
    }

    #[test]
    fn authenticate_unknown_email_is_not_found() {
        let (mut dir, _) = directory_with_patient();

        let err = dir.authenticate("nobody@example.com", "x").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!dir.is_authenticated());
    }

    #[test]
    fn authenticate_is_case_sensitive() {
        let (mut dir, _) = directory_with_patient();
        assert!(dir.authenticate("Patient@Demo.com", "x").is_err());
    }

    #[test]
    fn authenticate_requires_password() {
        let (mut dir, _) = directory_with_patient();
        let err = dir.authenticate("patient@demo.com", "").unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
    }

    #[test]
    fn end_session_clears_binding() {
        let (mut dir, _) = directory_with_patient();
        dir.authenticate("patient@demo.com", "x").unwrap();

        dir.end_session();
        assert!(dir.current_session().is_none());

        // Second sign-out is a no-op
        dir.end_session();
        assert!(!dir.is_authenticated());
    }

    #[test]
    fn duplicate_email_rejected_by_default() {
        let (mut dir, _) = directory_with_patient();
        let err = dir
            .register("patient@demo.com", "pw", "Impostor", Role::Doctor)
            .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail(_)));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn duplicate_email_allowed_by_legacy_policy() {
        let mut dir = IdentityDirectory::new(DuplicateEmailPolicy::Allow);
        let first = dir.register("same@example.com", "pw", "First", Role::Patient).unwrap();
        let second = dir.register("same@example.com", "pw", "Second", Role::Patient).unwrap();

        assert_eq!(dir.len(), 2);
        assert_ne!(first.id, second.id);
        // Lookup resolves to the first registration
        assert_eq!(dir.find_by_email("same@example.com").unwrap().id, first.id);
    }

    #[test]
    fn update_profile_replaces_fields() {
        let (mut dir, account) = directory_with_patient();
        let updated = dir
            .update_profile(
                &account.id,
                ProfileUpdate {
                    name: "Anna Jones".into(),
                    email: "anna@example.com".into(),
                    details: ProfileDetails {
                        phone: Some("+1 555 123 4567".into()),
                        ..ProfileDetails::default()
                    },
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Anna Jones");
        assert_eq!(updated.role, Role::Patient);
        assert_eq!(updated.created_at, account.created_at);
        assert!(dir.find_by_email("patient@demo.com").is_none());
        assert_eq!(dir.find_by_email("anna@example.com").unwrap().id, account.id);
    }

    #[test]
    fn update_profile_keeps_own_email() {
        let (mut dir, account) = directory_with_patient();
        let update = ProfileUpdate {
            name: "Anna".into(),
            email: "patient@demo.com".into(),
            details: ProfileDetails::default(),
        };
        assert!(dir.update_profile(&account.id, update).is_ok());
    }

    #[test]
    fn update_profile_cannot_take_other_email() {
        let (mut dir, account) = directory_with_patient();
        dir.register("doctor@demo.com", "pw", "Dr. John Doe", Role::Doctor).unwrap();

        let update = ProfileUpdate {
            name: "Anna".into(),
            email: "doctor@demo.com".into(),
            details: ProfileDetails::default(),
        };
        let err = dir.update_profile(&account.id, update).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail(_)));
    }

    #[test]
    fn update_unknown_account_is_not_found() {
        let mut dir = IdentityDirectory::default();
        let update = ProfileUpdate {
            name: "Ghost".into(),
            email: "ghost@example.com".into(),
            details: ProfileDetails::default(),
        };
        let err = dir.update_profile(&Uuid::new_v4(), update).unwrap_err();
        assert!(err.is_not_found());
    }
}
