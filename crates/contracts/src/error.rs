//! Layered error definitions
//!
//! Categorized by source: config / input / host / surface

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Input Errors =====
    /// No video source was supplied to `load`
    #[error("missing video source")]
    MissingSource,

    /// Sample stream lacks required columns
    #[error("malformed sample stream: missing required fields {missing:?}")]
    MalformedInput { missing: Vec<String> },

    /// Sample stream could not be fetched
    #[error("failed to fetch '{source_ref}': {message}")]
    Fetch { source_ref: String, message: String },

    // ===== Host Errors =====
    /// Host never reported a readiness signal within the bounded wait
    #[error("readiness timeout: waited {waited_ms}ms for '{signal}'")]
    ReadinessTimeout { signal: String, waited_ms: u64 },

    /// Host rejected an operation (attach, playback control)
    #[error("video host error: {message}")]
    Host { message: String },

    /// Host has no decodable frame at the moment
    #[error("video frame unavailable: {message}")]
    FrameUnavailable { message: String },

    // ===== Surface Errors =====
    /// Drawing surface rejected a draw call
    #[error("surface error: {message}")]
    Surface { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create fetch error
    pub fn fetch(source_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            source_ref: source_ref.into(),
            message: message.into(),
        }
    }

    /// Create readiness timeout error
    pub fn readiness_timeout(signal: impl Into<String>, waited_ms: u64) -> Self {
        Self::ReadinessTimeout {
            signal: signal.into(),
            waited_ms,
        }
    }

    /// Create host error
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Create frame-unavailable error
    pub fn frame_unavailable(message: impl Into<String>) -> Self {
        Self::FrameUnavailable {
            message: message.into(),
        }
    }

    /// Create surface error
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }
}
