use shared::{
    domain::{ConsentId, HospitalId},
    error::{ErrorCode, PortalError},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsentError {
    #[error("unknown consent {0}")]
    UnknownConsent(ConsentId),
    #[error("unknown hospital {0}")]
    UnknownHospital(HospitalId),
}

impl From<ConsentError> for PortalError {
    fn from(value: ConsentError) -> Self {
        PortalError::new(ErrorCode::NotFound, value.to_string())
    }
}
