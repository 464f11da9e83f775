//! Demo data: two accounts and two requests, matching what the portal
//! shows on first launch.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::PortalConfig;
use crate::core_state::{CoreError, PortalState};
use crate::models::{
    Account, Attachment, Prescription, PrescriptionRequest, ProfileDetails, RequestStatus, Role,
};

pub const DEMO_PATIENT_EMAIL: &str = "patient@demo.com";
pub const DEMO_PATIENT_NAME: &str = "Anna Smith";
pub const DEMO_DOCTOR_EMAIL: &str = "doctor@demo.com";
pub const DEMO_DOCTOR_NAME: &str = "Dr. John Doe";

/// A portal pre-loaded with the demo accounts and requests. Nobody is
/// signed in.
pub fn demo_state(config: PortalConfig) -> Result<PortalState, CoreError> {
    let state = PortalState::new(config);
    let now = Utc::now();

    let patient = Account {
        id: Uuid::new_v4(),
        email: DEMO_PATIENT_EMAIL.to_string(),
        name: DEMO_PATIENT_NAME.to_string(),
        role: Role::Patient,
        created_at: now - Duration::days(30),
        details: ProfileDetails::default(),
    };
    let doctor = Account {
        id: Uuid::new_v4(),
        email: DEMO_DOCTOR_EMAIL.to_string(),
        name: DEMO_DOCTOR_NAME.to_string(),
        role: Role::Doctor,
        created_at: now - Duration::days(365),
        details: ProfileDetails::default(),
    };

    let pending_created = now - Duration::days(2);
    let pending = PrescriptionRequest {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        patient_name: patient.name.clone(),
        patient_email: patient.email.clone(),
        title: "Antidepressant Prescription Extension".to_string(),
        description: "Taking sertraline 50mg for 6 months. Feeling good, would like to \
                      extend the prescription."
            .to_string(),
        symptoms: vec!["Anxiety".to_string(), "Sleep Disorders".to_string()],
        attachments: vec![Attachment {
            id: Uuid::new_v4(),
            name: "previous_prescription.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 245_000,
            url: "#".to_string(),
        }],
        status: RequestStatus::Pending,
        created_at: pending_created,
        updated_at: pending_created,
        doctor_notes: None,
        prescription: None,
    };

    let approved_id = Uuid::new_v4();
    let approved_issued = now - Duration::days(5);
    let approved = PrescriptionRequest {
        id: approved_id,
        patient_id: patient.id,
        patient_name: patient.name.clone(),
        patient_email: patient.email.clone(),
        title: "Consultation Regarding Panic Attacks".to_string(),
        description: "Panic attacks have increased in the last month. Please consider \
                      prescribing medication."
            .to_string(),
        symptoms: vec![
            "Panic Attacks".to_string(),
            "Increased Heart Rate".to_string(),
            "Dizziness".to_string(),
        ],
        attachments: vec![],
        status: RequestStatus::Approved,
        created_at: now - Duration::days(7),
        updated_at: approved_issued,
        doctor_notes: Some("Recommend starting with the minimum dose.".to_string()),
        prescription: Some(Prescription {
            id: Uuid::new_v4(),
            request_id: approved_id,
            medication: "Alprazolam".to_string(),
            dosage: "0.25 mg".to_string(),
            frequency: "As needed, no more than 2 times a day".to_string(),
            duration: "2 weeks".to_string(),
            instructions: "Take when panic symptoms appear. Do not combine with alcohol."
                .to_string(),
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            issued_at: approved_issued,
        }),
    };

    {
        let mut directory = state.write_directory()?;
        directory.insert(patient)?;
        directory.insert(doctor)?;
    }
    {
        let mut ledger = state.write_ledger()?;
        ledger.insert(pending)?;
        ledger.insert(approved)?;
    }

    tracing::info!("Demo data loaded");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequestStats, StatusFilter};

    #[tokio::test]
    async fn demo_accounts_can_sign_in() {
        let state = demo_state(PortalConfig::immediate()).unwrap();
        assert!(state.current_session().unwrap().is_none());

        let patient = state.authenticate(DEMO_PATIENT_EMAIL, "demo").await.unwrap();
        assert_eq!(patient.role, Role::Patient);
        assert_eq!(patient.name, DEMO_PATIENT_NAME);

        let doctor = state.authenticate(DEMO_DOCTOR_EMAIL, "demo").await.unwrap();
        assert_eq!(doctor.role, Role::Doctor);
        assert_eq!(state.require_session().unwrap().id, doctor.id);
    }

    #[tokio::test]
    async fn demo_requests_are_newest_first() {
        let state = demo_state(PortalConfig::immediate()).unwrap();
        state.authenticate(DEMO_DOCTOR_EMAIL, "demo").await.unwrap();

        let all = state.list_requests(StatusFilter::All).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at > all[1].created_at);
        assert_eq!(all[0].status, RequestStatus::Pending);
        assert_eq!(all[0].title, "Antidepressant Prescription Extension");
        assert_eq!(all[0].symptoms, vec!["Anxiety", "Sleep Disorders"]);
        assert_eq!(all[0].attachments[0].name, "previous_prescription.pdf");
        assert_eq!(all[0].attachments[0].size, 245_000);

        let approved = &all[1];
        assert_eq!(approved.title, "Consultation Regarding Panic Attacks");
        assert_eq!(
            approved.symptoms,
            vec!["Panic Attacks", "Increased Heart Rate", "Dizziness"]
        );
        assert_eq!(
            approved.doctor_notes.as_deref(),
            Some("Recommend starting with the minimum dose.")
        );
        let rx = approved.prescription.as_ref().unwrap();
        assert_eq!(rx.medication, "Alprazolam");
        assert_eq!(rx.dosage, "0.25 mg");
        assert_eq!(rx.doctor_name, DEMO_DOCTOR_NAME);
        assert_eq!(rx.request_id, approved.id);
        assert_eq!(rx.issued_at, approved.updated_at);

        assert_eq!(
            state.dashboard_stats().unwrap(),
            RequestStats { total: 2, pending: 1, approved: 1, rejected: 0 }
        );
    }

    #[tokio::test]
    async fn demo_pending_request_can_be_reviewed() {
        let state = demo_state(PortalConfig::immediate()).unwrap();
        state.authenticate(DEMO_DOCTOR_EMAIL, "demo").await.unwrap();
        let pending = state
            .list_requests(StatusFilter::Only(RequestStatus::Pending))
            .unwrap();

        let rejected = state
            .reject(&pending[0].id, "Please book a consultation first")
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert!(rejected.updated_at > pending[0].updated_at);
    }

    #[tokio::test]
    async fn demo_patient_sees_own_requests() {
        let state = demo_state(PortalConfig::immediate()).unwrap();
        let patient = state.authenticate(DEMO_PATIENT_EMAIL, "demo").await.unwrap();

        let mine = state.requests_for_patient(&patient.id).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.patient_email == DEMO_PATIENT_EMAIL));
        assert_eq!(
            state.dashboard_stats().unwrap(),
            RequestStats { total: 2, pending: 1, approved: 1, rejected: 0 }
        );
    }
}
