//! Error types for accountflow-core
//!
//! Every failure of the service layer maps to a [`CoreError`] carrying an
//! error code, a severity and user-facing suggestions.

use accountflow_store::StoreError;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,
    /// Payload rejected
    ValidationError,
    /// Parent account missing from the hierarchy
    OrphanParent,
    /// Parent chain revisits an account
    CyclicHierarchy,
    /// Account would be deeper than the allowed degree
    DegreeExceeded,
    /// Account still has children
    HasChildren,
    /// Persistence failure
    StoreError,
    /// IO error
    IoError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::OrphanParent => write!(f, "ORPHAN_PARENT"),
            ErrorCode::CyclicHierarchy => write!(f, "CYCLIC_HIERARCHY"),
            ErrorCode::DegreeExceeded => write!(f, "DEGREE_EXCEEDED"),
            ErrorCode::HasChildren => write!(f, "HAS_CHILDREN"),
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation rejected, user can fix it
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for accountflow-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Parent account not found in hierarchy: {id}")]
    OrphanParent { id: String },

    #[error("Cyclic account hierarchy: {}", .ids.join(" -> "))]
    CyclicHierarchy { ids: Vec<String> },

    #[error("Account degree cannot exceed {max}")]
    DegreeExceeded { max: u8 },

    #[error("Account {id} still has {count} child account(s)")]
    HasChildren { id: String, count: usize },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("IO error occurred")]
    IoError,

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for payload validation failures
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::OrphanParent { .. } => ErrorCode::OrphanParent,
            CoreError::CyclicHierarchy { .. } => ErrorCode::CyclicHierarchy,
            CoreError::DegreeExceeded { .. } => ErrorCode::DegreeExceeded,
            CoreError::HasChildren { .. } => ErrorCode::HasChildren,
            CoreError::Store { .. } => ErrorCode::StoreError,
            CoreError::IoError => ErrorCode::IoError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::OrphanParent { .. } => ErrorSeverity::Warning,
            CoreError::CyclicHierarchy { .. } => ErrorSeverity::Error,
            CoreError::DegreeExceeded { .. } => ErrorSeverity::Warning,
            CoreError::HasChildren { .. } => ErrorSeverity::Warning,
            CoreError::Store { .. } => ErrorSeverity::Error,
            CoreError::IoError => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NotFound { kind, .. } => {
                details = details.with_suggestion(format!(
                    "The {} may have been removed. Reload the list and try again.",
                    kind.to_lowercase()
                ));
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "Review the form fields and submit again.".to_string(),
                );
            }
            CoreError::OrphanParent { id } => {
                details = details.with_detail(serde_json::json!({ "parent_id": id }));
                details = details.with_suggestion(
                    "Select a parent account from the current chart of accounts.".to_string(),
                );
            }
            CoreError::CyclicHierarchy { ids } => {
                details = details.with_detail(serde_json::json!({ "cycle": ids }));
                details = details.with_suggestion(
                    "An account cannot be placed under itself or one of its descendants.".to_string(),
                );
            }
            CoreError::DegreeExceeded { max } => {
                details = details.with_suggestion(format!(
                    "Choose a parent account of degree {} or lower.",
                    max.saturating_sub(1)
                ));
            }
            CoreError::HasChildren { .. } => {
                details = details.with_suggestion(
                    "Delete or move the child accounts first.".to_string(),
                );
            }
            CoreError::Store { .. } | CoreError::IoError => {
                details = details.with_suggestion(
                    "Check that the data directory is writable.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

impl From<StoreError> for CoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { kind, id } => CoreError::NotFound {
                kind: kind.to_string(),
                id,
            },
            StoreError::IoError(_) => CoreError::IoError,
            other => CoreError::Store {
                message: other.to_string(),
            },
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "accountflow::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "accountflow::error",
                "ERROR [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }
}

// ==================== Tests ====================
