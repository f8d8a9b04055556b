//! Error handling for Quorum Core.
//!
//! This module provides:
//! - A single error type with machine-readable codes and context
//! - HTTP status code mapping for API responses
//! - User-facing messages kept apart from internal detail
//! - Severity-aware logging through `tracing`
//! - An error counter exported through `metrics`
//!
//! # Usage
//!
//! ```rust,ignore
//! use quorum_core::error::{QuorumError, Result};
//!
//! fn lookup(id: &str, events: &[ContainerEvent]) -> Result<()> {
//!     if events.is_empty() {
//!         return Err(QuorumError::container_not_found(id));
//!     }
//!     Ok(())
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Quorum operations.
pub type Result<T> = std::result::Result<T, QuorumError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Container Errors (1000-1099)
    ContainerNotFound,

    // Store Errors (2000-2099)
    DatabaseError,
    DatabaseConnectionFailed,
    DatabaseQueryFailed,

    // Serialization Errors (2200-2299)
    SerializationError,
    DeserializationError,

    // Side-channel Errors (3000-3099)
    NotificationError,
    AuditLogError,

    // Validation Errors (4100-4199)
    ValidationError,
    InvalidState,
    InvalidTimestamp,
    MissingRequiredField,

    // Configuration Errors (5000-5099)
    ConfigurationError,
    InvalidConfiguration,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::ContainerNotFound => 1000,

            Self::DatabaseError => 2000,
            Self::DatabaseConnectionFailed => 2001,
            Self::DatabaseQueryFailed => 2002,

            Self::SerializationError => 2200,
            Self::DeserializationError => 2201,

            Self::NotificationError => 3000,
            Self::AuditLogError => 3001,

            Self::ValidationError => 4100,
            Self::InvalidState => 4101,
            Self::InvalidTimestamp => 4102,
            Self::MissingRequiredField => 4103,

            Self::ConfigurationError => 5000,
            Self::InvalidConfiguration => 5001,
        }
    }

    /// Get the HTTP status code for this error.
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::ContainerNotFound => StatusCode::NOT_FOUND,

            Self::ValidationError
            | Self::InvalidState
            | Self::InvalidTimestamp
            | Self::MissingRequiredField => StatusCode::UNPROCESSABLE_ENTITY,

            Self::DatabaseConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,

            Self::NotificationError | Self::AuditLogError => StatusCode::BAD_GATEWAY,

            Self::DatabaseError
            | Self::DatabaseQueryFailed
            | Self::SerializationError
            | Self::DeserializationError
            | Self::ConfigurationError
            | Self::InvalidConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error is retryable by the caller.
    ///
    /// Nothing inside the core retries; this only informs clients.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseConnectionFailed
                | Self::DatabaseQueryFailed
                | Self::NotificationError
                | Self::AuditLogError
        )
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "container",
            2000..=2099 => "store",
            2200..=2299 => "serialization",
            3000..=3099 => "side_channel",
            4100..=4199 => "validation",
            5000..=5099 => "configuration",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// User errors (bad input, unknown container)
    Low,
    /// Degraded side channels (alert or audit delivery)
    Medium,
    /// System errors (store failures)
    High,
    /// Critical errors requiring immediate attention
    Critical,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::ContainerNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidState
            | ErrorCode::InvalidTimestamp
            | ErrorCode::MissingRequiredField => Self::Low,

            ErrorCode::NotificationError | ErrorCode::AuditLogError => Self::Medium,

            ErrorCode::DatabaseError
            | ErrorCode::DatabaseQueryFailed
            | ErrorCode::SerializationError
            | ErrorCode::DeserializationError
            | ErrorCode::ConfigurationError
            | ErrorCode::InvalidConfiguration => Self::High,

            ErrorCode::DatabaseConnectionFailed => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Details
// ═══════════════════════════════════════════════════════════════════════════════

/// Additional structured details about an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Additional context key-value pairs
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,

    /// Related entity ID (container id, field name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Related entity type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    /// Suggested action for resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_action = Some(suggestion.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.context.is_empty() && self.entity_id.is_none() && self.suggested_action.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Quorum Core.
#[derive(Error, Debug)]
pub struct QuorumError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-friendly error message (safe to expose to clients)
    user_message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// Additional structured details
    details: ErrorDetails,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for QuorumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl QuorumError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and user message.
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            details: ErrorDetails::default(),
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, user_message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add error details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Add context to details.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.context.insert(key.into(), v);
        }
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    /// Stable wire string for the error code (e.g. `CONTAINER_NOT_FOUND`).
    pub fn error_code(&self) -> &'static str {
        match self.code {
            ErrorCode::ContainerNotFound => "CONTAINER_NOT_FOUND",
            ErrorCode::DatabaseError
            | ErrorCode::DatabaseConnectionFailed
            | ErrorCode::DatabaseQueryFailed => "STORE_ERROR",
            ErrorCode::SerializationError | ErrorCode::DeserializationError => "SERIALIZATION_ERROR",
            ErrorCode::NotificationError => "NOTIFICATION_ERROR",
            ErrorCode::AuditLogError => "AUDIT_LOG_ERROR",
            ErrorCode::ValidationError
            | ErrorCode::InvalidState
            | ErrorCode::InvalidTimestamp
            | ErrorCode::MissingRequiredField => "VALIDATION_ERROR",
            ErrorCode::ConfigurationError | ErrorCode::InvalidConfiguration => "CONFIG_ERROR",
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log at a level matching severity. Caller mistakes stay at debug so
    /// that 404s and 422s do not flood the error stream.
    pub fn log(&self) {
        let status = self.http_status().as_u16();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => error!(
                code = %self.code,
                http_status = status,
                internal = ?self.internal_message,
                source = ?self.source,
                "{}", self.user_message
            ),
            ErrorSeverity::Medium => warn!(
                code = %self.code,
                internal = ?self.internal_message,
                "{}", self.user_message
            ),
            ErrorSeverity::Low => debug!(
                code = %self.code,
                http_status = status,
                "{}", self.user_message
            ),
        }
    }

    fn record_metrics(&self) {
        counter!(
            "quorum_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
            "severity" => format!("{:?}", self.severity()),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// API Response
// ═══════════════════════════════════════════════════════════════════════════════

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Whether the request was successful (always false for errors)
    pub success: bool,

    /// Human-readable message
    pub error: String,

    /// Stable machine-readable code
    pub error_code: String,

    /// Detailed error information
    pub info: ErrorInfo,
}

/// Detailed error information for API responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,

    pub numeric_code: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,

    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<&QuorumError> for ErrorResponse {
    fn from(error: &QuorumError) -> Self {
        Self {
            success: false,
            error: error.user_message.to_string(),
            error_code: error.error_code().to_string(),
            info: ErrorInfo {
                code: error.code,
                numeric_code: error.code.numeric_code(),
                details: if error.details.is_empty() {
                    None
                } else {
                    Some(error.details.clone())
                },
                timestamp: chrono::Utc::now(),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Axum Integration
// ═══════════════════════════════════════════════════════════════════════════════

impl IntoResponse for QuorumError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.http_status();
        let response = ErrorResponse::from(&self);

        (status, Json(response)).into_response()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<sqlx::Error> for QuorumError {
    fn from(error: sqlx::Error) -> Self {
        let (code, user_msg) = match &error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => (
                ErrorCode::DatabaseConnectionFailed,
                "Event store is unreachable",
            ),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => (
                ErrorCode::DeserializationError,
                "Stored event could not be decoded",
            ),
            _ => (ErrorCode::DatabaseQueryFailed, "Event store query failed"),
        };

        Self::with_internal(code, user_msg, error.to_string()).with_source(error)
    }
}

impl From<sqlx::migrate::MigrateError> for QuorumError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        Self::with_internal(
            ErrorCode::DatabaseError,
            "Event store migration failed",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<redis::RedisError> for QuorumError {
    fn from(error: redis::RedisError) -> Self {
        Self::with_internal(
            ErrorCode::NotificationError,
            "Alert channel operation failed",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<reqwest::Error> for QuorumError {
    fn from(error: reqwest::Error) -> Self {
        let user_msg = if error.is_timeout() {
            "Alert webhook timed out"
        } else if error.is_connect() {
            "Alert webhook is unreachable"
        } else {
            "Alert webhook request failed"
        };

        Self::with_internal(ErrorCode::NotificationError, user_msg, error.to_string())
            .with_source(error)
    }
}

impl From<serde_json::Error> for QuorumError {
    fn from(error: serde_json::Error) -> Self {
        let code = if error.is_data() || error.is_syntax() || error.is_eof() {
            ErrorCode::DeserializationError
        } else {
            ErrorCode::SerializationError
        };

        Self::with_internal(code, "Failed to process JSON data", error.to_string())
            .with_source(error)
    }
}

impl From<std::io::Error> for QuorumError {
    fn from(error: std::io::Error) -> Self {
        Self::with_internal(
            ErrorCode::AuditLogError,
            "Audit log storage failed",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<config::ConfigError> for QuorumError {
    fn from(error: config::ConfigError) -> Self {
        let (code, user_msg) = match &error {
            config::ConfigError::NotFound(_) => (
                ErrorCode::ConfigurationError,
                "Required configuration not found",
            ),
            config::ConfigError::PathParse(_) | config::ConfigError::FileParse { .. } => (
                ErrorCode::InvalidConfiguration,
                "Configuration file is invalid",
            ),
            _ => (
                ErrorCode::ConfigurationError,
                "Configuration error occurred",
            ),
        };

        Self::with_internal(code, user_msg, error.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Convenience Constructors for Domain Errors
// ═══════════════════════════════════════════════════════════════════════════════

impl QuorumError {
    /// No events exist for the container.
    pub fn container_not_found(container_id: impl Into<String>) -> Self {
        let id = container_id.into();
        Self::new(
            ErrorCode::ContainerNotFound,
            format!("No events found for container {}", id),
        )
        .with_details(ErrorDetails::new().with_entity("container", id))
    }

    /// A state value outside the closed set.
    pub fn invalid_state(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            ErrorCode::InvalidState,
            format!(
                "Invalid container state '{}': expected one of operational, damaged, unknown",
                value
            ),
        )
        .with_details(ErrorDetails::new().with_entity("field", "state"))
        .with_context("value", value)
    }

    /// A timestamp that is not ISO-8601 / RFC 3339.
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(
            ErrorCode::InvalidTimestamp,
            format!("Invalid timestamp '{}': expected an ISO-8601 date-time", value),
        )
        .with_details(
            ErrorDetails::new()
                .with_entity("field", "timestamp")
                .with_suggestion("Use a value such as 2024-05-01T12:00:00Z"),
        )
    }

    /// A required field was empty or absent.
    pub fn missing_field(field: &'static str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Field '{}' is required and cannot be empty", field),
        )
        .with_details(ErrorDetails::new().with_entity("field", field))
    }

    /// Alert channel failure.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::with_internal(
            ErrorCode::NotificationError,
            "Alert channel operation failed",
            message,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
