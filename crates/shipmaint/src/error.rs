//! Error types for shipmaint.
//!
//! This module defines all error types used throughout the shipmaint crate.
//! Every error maps onto one [`ErrorKind`] so callers can tell a missing
//! record from a rejected form from an unusable storage backend, even when
//! they render all three the same way.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::{Permission, Role};

/// The main error type for shipmaint operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A record addressed by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Which collection was searched.
        entity: &'static str,
        /// The id that did not resolve.
        id: String,
    },

    /// A record failed field-level validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The serialized document does not fit in the configured quota.
    #[error("storage quota exceeded: document is {size} bytes, quota is {quota} bytes")]
    QuotaExceeded {
        /// Size of the serialized document.
        size: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// The stored document exists but cannot be read as a record document.
    #[error("stored document is corrupt: {message}")]
    CorruptStore {
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to upgrade the stored document to the current schema version.
    #[error("document migration failed: {message}")]
    Migration {
        /// Description of what went wrong.
        message: String,
    },

    // === Access Errors ===
    /// The acting user lacks a permission.
    #[error("{role} is not allowed to {permission}")]
    PermissionDenied {
        /// Role of the acting user.
        role: Role,
        /// The permission that was checked.
        permission: Permission,
    },

    /// No user is logged in, or the credentials were rejected.
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for shipmaint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A record lookup did not resolve.
    NotFound,
    /// Input was rejected by validation or referential checks.
    ValidationFailed,
    /// The backend could not be opened, written, or is out of space.
    StorageUnavailable,
    /// The stored document is unreadable.
    CorruptStore,
    /// The acting user may not perform the operation.
    PermissionDenied,
    /// Anything else.
    Other,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a not-found error for the given collection.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a corrupt-store error.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptStore {
            message: message.into(),
        }
    }

    /// Create a validation error carrying a single field failure.
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationFailed,
            Self::DatabaseOpen { .. }
            | Self::DatabaseQuery(_)
            | Self::QuotaExceeded { .. }
            | Self::Io(_)
            | Self::DirectoryCreate { .. } => ErrorKind::StorageUnavailable,
            Self::CorruptStore { .. } | Self::Migration { .. } => ErrorKind::CorruptStore,
            Self::PermissionDenied { .. } | Self::Unauthenticated(_) => {
                ErrorKind::PermissionDenied
            }
            Self::ConfigLoad(_)
            | Self::ConfigValidation { .. }
            | Self::Json(_)
            | Self::Internal(_) => ErrorKind::Other,
        }
    }

    /// Check if this error means a record was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::ValidationFailed
    }

    /// Check if this error means the storage backend is unusable.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        self.kind() == ErrorKind::StorageUnavailable
    }

    /// The field failures, if this is a validation error.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field, using its serialized name.
    pub field: &'static str,
    /// Human readable message.
    pub message: String,
}

/// The collected field failures of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Record a failure for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// True when no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has at least one failure.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// All recorded failures, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Turn the collected failures into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any failure was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("ship", "s9");
        assert_eq!(err.to_string(), "ship not found: s9");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_builds_single_field_error() {
        let err = Error::invalid("imo", "IMO number must be 7 digits");
        assert!(err.is_validation());
        let errors = err.validation_errors().unwrap();
        assert!(errors.has("imo"));
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(
            err.to_string(),
            "validation failed: imo: IMO number must be 7 digits"
        );
    }

    #[test]
    fn test_validation_errors_display_joins_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "Ship name is required");
        errors.add("flag", "Flag is required");
        assert_eq!(
            errors.to_string(),
            "name: Ship name is required; flag: Flag is required"
        );
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::default().into_result().is_ok());
    }

    #[test]
    fn test_quota_exceeded_is_storage_unavailable() {
        let err = Error::QuotaExceeded {
            size: 10,
            quota: 5,
        };
        assert!(err.is_storage_unavailable());
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn test_corrupt_store_kind() {
        let err = Error::corrupt("missing field `ships`");
        assert_eq!(err.kind(), ErrorKind::CorruptStore);
        assert!(err.to_string().contains("ships"));
    }

    #[test]
    fn test_permission_denied_display() {
        let err = Error::PermissionDenied {
            role: Role::Engineer,
            permission: Permission::DeleteShip,
        };
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "Engineer is not allowed to delete ships");
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
            assert!(err.is_storage_unavailable());
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
