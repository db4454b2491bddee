//! Error types for spendscope-core
//!
//! Error codes, severities and user-facing details for everything the
//! analysis core can report. None of these are fatal: each one maps to a
//! message the dashboard shows while the filter state stays intact.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No authenticated user for an operation that needs one
    MissingIdentity,
    /// Transaction source failed
    ServiceError,
    /// Filter transition not allowed from the current state
    InvalidTransition,
    /// Validation error
    ValidationError,
    /// Category catalog could not be loaded
    CatalogError,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MissingIdentity => write!(f, "MISSING_IDENTITY"),
            ErrorCode::ServiceError => write!(f, "SERVICE_ERROR"),
            ErrorCode::InvalidTransition => write!(f, "INVALID_TRANSITION"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::CatalogError => write!(f, "CATALOG_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
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
    /// The user may retry the operation
    pub retryable: bool,
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
            retryable: false,
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

    /// Mark as retryable
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
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
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Blocking - nothing can proceed until resolved
    Blocking,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Blocking => write!(f, "blocking"),
        }
    }
}

/// Main error type for spendscope-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No authenticated user")]
    MissingIdentity,

    #[error("Transaction service error: {message}")]
    Service { message: String },

    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MissingIdentity => ErrorCode::MissingIdentity,
            CoreError::Service { .. } => ErrorCode::ServiceError,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Catalog { .. } => ErrorCode::CatalogError,
            CoreError::Io(_) => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MissingIdentity => ErrorSeverity::Blocking,
            CoreError::Service { .. } => ErrorSeverity::Error,
            CoreError::InvalidTransition { .. } => ErrorSeverity::Info,
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::Catalog { .. } => ErrorSeverity::Error,
            CoreError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Whether retrying the same operation can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Service { .. } | CoreError::Io(_))
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string())
            .retryable(self.is_retryable());

        match self {
            CoreError::MissingIdentity => {
                details = details.with_suggestion(
                    "Sign in again, or switch to demo mode to explore sample data.".to_string()
                );
            }
            CoreError::Service { .. } => {
                details = details.with_suggestion(
                    "The transaction service did not respond as expected. Try again shortly.".to_string()
                );
            }
            CoreError::InvalidTransition { message } => {
                details = details.with_detail(serde_json::json!({ "transition": message }));
                details = details.with_suggestion(
                    "Select a category before choosing one of its subcategories.".to_string()
                );
            }
            CoreError::Validation { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User ID (if authenticated)
    pub user_id: Option<String>,
    /// Operation being performed
    pub operation: String,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            user_id: None,
            operation: operation.into(),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "spendscope::error",
                "[{}] {} - Operation: {} - User: {:?}",
                error.code(),
                error,
                context.operation,
                context.user_id
            ),
            ErrorSeverity::Error | ErrorSeverity::Blocking => log::error!(
                target: "spendscope::error",
                "[{}] {} - Operation: {} - User: {:?}",
                error.code(),
                error,
                context.operation,
                context.user_id
            ),
        }
    }
}

// ==================== Tests ====================
