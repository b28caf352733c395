//! Custom error types for the oil change tracker
//!
//! Provides structured error handling with context for different failure scenarios.

use serde::Serialize;
use std::fmt;

/// Main error type for the tracker
#[derive(Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Rejected request input
    Validation(ValidationError),

    /// Due-status evaluation errors
    Evaluation(EvaluationError),

    /// Notification provider errors
    Dispatch(DispatchError),

    /// Sweep orchestration errors
    Sweep(SweepError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Structured request validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

/// Evaluation error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Threshold outside its accepted range
    InvalidConfiguration {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Next-due date cannot be represented
    DateOutOfRange { months: i64 },
}

/// Notification provider error variants
#[derive(Debug)]
pub enum DispatchError {
    /// Provider has no credentials or endpoint configured
    NotConfigured { provider: String },

    /// Transport-level failure
    RequestFailed { provider: String, reason: String },

    /// Provider answered with a non-success status
    Rejected {
        provider: String,
        status: u16,
        body: String,
    },
}

/// Sweep error variants
#[derive(Debug)]
pub enum SweepError {
    /// Another sweep is still in progress in this process
    AlreadyRunning { trigger: String, started_at: String },

    /// Candidate lookup failed, nothing was dispatched
    StorageFailed { reason: String },
}

impl ValidationError {
    pub fn new(fields: Vec<FieldError>) -> Self {
        Self { fields }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }
}

// Implement Display for all error types
impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Config(e) => write!(f, "Configuration error: {}", e),
            TrackerError::Validation(e) => write!(f, "Validation error: {}", e),
            TrackerError::Evaluation(e) => write!(f, "Evaluation error: {}", e),
            TrackerError::Dispatch(e) => write!(f, "Dispatch error: {}", e),
            TrackerError::Sweep(e) => write!(f, "Sweep error: {}", e),
            TrackerError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::InvalidConfiguration {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "Invalid configuration: {} = {} is outside [{}, {}]",
                    field, value, min, max
                )
            }
            EvaluationError::DateOutOfRange { months } => {
                write!(f, "Next due date is out of range ({} months)", months)
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NotConfigured { provider } => {
                write!(f, "{} provider not configured", provider)
            }
            DispatchError::RequestFailed { provider, reason } => {
                write!(f, "{} request failed: {}", provider, reason)
            }
            DispatchError::Rejected {
                provider,
                status,
                body,
            } => {
                write!(f, "{} returned status {}: {}", provider, status, body)
            }
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::AlreadyRunning {
                trigger,
                started_at,
            } => {
                write!(
                    f,
                    "A sweep triggered by {} is already running (started {})",
                    trigger, started_at
                )
            }
            SweepError::StorageFailed { reason } => {
                write!(f, "Vehicle lookup failed: {}", reason)
            }
        }
    }
}

// Implement std::error::Error
impl std::error::Error for TrackerError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for EvaluationError {}
impl std::error::Error for DispatchError {}
impl std::error::Error for SweepError {}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        TrackerError::Other(err.to_string())
    }
}

// Conversion helpers for sub-errors
impl From<ConfigError> for TrackerError {
    fn from(err: ConfigError) -> Self {
        TrackerError::Config(err)
    }
}

impl From<ValidationError> for TrackerError {
    fn from(err: ValidationError) -> Self {
        TrackerError::Validation(err)
    }
}

impl From<EvaluationError> for TrackerError {
    fn from(err: EvaluationError) -> Self {
        TrackerError::Evaluation(err)
    }
}

impl From<DispatchError> for TrackerError {
    fn from(err: DispatchError) -> Self {
        TrackerError::Dispatch(err)
    }
}

impl From<SweepError> for TrackerError {
    fn from(err: SweepError) -> Self {
        TrackerError::Sweep(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError { fields }
    }
}
