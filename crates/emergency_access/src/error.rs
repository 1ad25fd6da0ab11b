use shared::error::{ErrorCode, PortalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmergencyAccessError {
    #[error("no tokio runtime available to schedule the emergency access countdown")]
    SchedulerUnavailable,
}

impl From<EmergencyAccessError> for PortalError {
    fn from(value: EmergencyAccessError) -> Self {
        match value {
            EmergencyAccessError::SchedulerUnavailable => {
                PortalError::new(ErrorCode::Unavailable, value.to_string())
            }
        }
    }
}
