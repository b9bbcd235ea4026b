use sdb_store::StoreError;

/// Errors produced by variable store and command log operations.
///
/// Absent variables and empty stacks are not errors; they are ordinary
/// replies. Everything here means the backend failed or holds data this
/// crate did not write.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The backing store failed. Propagated unchanged, never retried.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("corrupt command stack {stack}: {reason}")]
    CorruptStack { stack: String, reason: String },

    #[error("corrupt variable {name}: value is not a string")]
    CorruptVariable { name: String },

    /// A stored command is missing the value it needs to replay.
    #[error("malformed {kind} command for {name}: missing {field}")]
    MalformedCommand {
        kind: String,
        name: String,
        field: &'static str,
    },

    #[error("consistency lock poisoned")]
    LockPoisoned,
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
