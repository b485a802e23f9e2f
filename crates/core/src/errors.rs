use thiserror::Error;

use crate::analysis::selection::RunRejection;
use crate::offers::loader::OfferLoadError;
use crate::wizard::WizardError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    OfferLoad(#[from] OfferLoadError),
    #[error(transparent)]
    AnalysisRejected(#[from] RunRejection),
    #[error("session `{0}` not found")]
    SessionNotFound(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<WizardError> for ApplicationError {
    fn from(value: WizardError) -> Self {
        Self::Domain(DomainError::Wizard(value))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

const INTERNAL_MESSAGE: &str = "Si è verificato un errore imprevisto.";
const UNASSIGNED: &str = "unassigned";

impl InterfaceError {
    /// Text safe to show to visitors. Internal failures never leak their detail.
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::ServiceUnavailable { message, .. } => message,
            Self::Internal { .. } => INTERNAL_MESSAGE,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = UNASSIGNED.to_owned();
        match value {
            ApplicationError::Domain(DomainError::Wizard(error)) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Domain(DomainError::InvariantViolation(_)) => Self::BadRequest {
                message: "Richiesta non valida.".to_owned(),
                correlation_id,
            },
            ApplicationError::OfferLoad(error) if error.is_missing() => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            ApplicationError::OfferLoad(error) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
            ApplicationError::AnalysisRejected(RunRejection::AlreadyRunning) => Self::Conflict {
                message: RunRejection::AlreadyRunning.to_string(),
                correlation_id,
            },
            ApplicationError::AnalysisRejected(rejection) => {
                Self::BadRequest { message: rejection.to_string(), correlation_id }
            }
            ApplicationError::SessionNotFound(_) => Self::NotFound {
                message: "Sessione scaduta o inesistente.".to_owned(),
                correlation_id,
            },
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
