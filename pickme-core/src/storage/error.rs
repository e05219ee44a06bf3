//! Storage Errors
//!
//! `TigerStyle`: Explicit error types with context. Engines pass these
//! through unchanged and never retry.

use thiserror::Error;

/// Errors from the persistence collaborator.
///
/// Appends and reads fail with distinct variants so a caller can tell a lost
/// selection or vote apart from a failed history load.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Record was rejected before it reached storage
    #[error("invalid record: {message}")]
    Validation {
        /// Why the record was rejected
        message: String,
    },

    /// Backend could not be reached
    #[error("connection error: {message}")]
    Connection {
        /// Driver message
        message: String,
    },

    /// A selection event or vote was not stored
    #[error("append failed: {message}")]
    Append {
        /// Driver message
        message: String,
    },

    /// History or votes could not be read back
    #[error("read failed: {message}")]
    Read {
        /// Driver message
        message: String,
    },

    /// Tables are missing or could not be created
    #[error("schema error: {message}")]
    Schema {
        /// What is wrong with the schema
        message: String,
    },

    /// Stored rows could not be turned back into records
    #[error("corrupt record: {message}")]
    CorruptRecord {
        /// What was inconsistent
        message: String,
    },

    /// Fault injected by the simulation harness
    #[error("simulated fault: {fault_type} during {operation}")]
    SimulatedFault {
        /// Name of the injected fault
        fault_type: String,
        /// Backend operation that was hit
        operation: String,
    },
}

impl StorageError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an append error.
    #[must_use]
    pub fn append(message: impl Into<String>) -> Self {
        Self::Append {
            message: message.into(),
        }
    }

    /// Create a read error.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    #[must_use]
    pub(crate) fn corrupt_record(message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            message: message.into(),
        }
    }

    #[must_use]
    pub(crate) fn simulated_fault(fault_type: impl Into<String>, operation: &str) -> Self {
        Self::SimulatedFault {
            fault_type: fault_type.into(),
            operation: operation.to_string(),
        }
    }

    /// Whether trying the same call again could succeed.
    ///
    /// Callers decide whether to retry; the engines never do.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::Append { .. }
                | Self::Read { .. }
                | Self::SimulatedFault { .. }
        )
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_fault_names_operation() {
        let err = StorageError::simulated_fault("storage_disk_full", "append_vote");
        assert_eq!(
            err.to_string(),
            "simulated fault: storage_disk_full during append_vote"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(StorageError::connection("refused").is_transient());
        assert!(StorageError::append("deadlock detected").is_transient());
        assert!(StorageError::read("statement timeout").is_transient());
        assert!(StorageError::simulated_fault("db_query_timeout", "query_votes").is_transient());

        assert!(!StorageError::corrupt_record("vote without candidates").is_transient());
        assert!(!StorageError::validation("too many candidates").is_transient());
        assert!(!StorageError::schema("table votes is missing").is_transient());
    }
}
