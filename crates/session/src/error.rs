//! Session error types

use contracts::ContractError;
use thiserror::Error;

/// Errors that reject a session operation
///
/// Sample stream failures never appear here; they degrade to an
/// overlay-less session with an advisory message.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `load` called without a video source
    #[error("missing video source")]
    MissingSource,

    /// A readiness signal did not arrive within its bounded wait
    #[error("readiness timeout: waited {waited_ms}ms for '{signal}'")]
    ReadinessTimeout { signal: &'static str, waited_ms: u64 },

    /// Operation on a destroyed session
    #[error("session destroyed")]
    Destroyed,

    /// Video host rejected an operation
    #[error("video host error: {0}")]
    Host(#[source] ContractError),
}

impl SessionError {
    pub fn readiness_timeout(signal: &'static str, waited_ms: u64) -> Self {
        Self::ReadinessTimeout { signal, waited_ms }
    }
}

impl From<SessionError> for ContractError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingSource => ContractError::MissingSource,
            SessionError::ReadinessTimeout { signal, waited_ms } => {
                ContractError::readiness_timeout(signal, waited_ms)
            }
            SessionError::Destroyed => ContractError::Other("session destroyed".to_string()),
            SessionError::Host(inner) => inner,
        }
    }
}

/// Session Result type alias
pub type Result<T> = std::result::Result<T, SessionError>;
