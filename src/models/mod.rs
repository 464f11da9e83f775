pub mod account;
pub mod enums;
pub mod request;

pub use account::{Account, ProfileDetails, ProfileUpdate};
pub use enums::{ParseEnumError, RequestStatus, ReviewDecision, Role};
pub use request::{
    Attachment, NewRequest, Prescription, PrescriptionOrder, PrescriptionRequest, Regimen,
    RequestStats, StatusFilter,
};
