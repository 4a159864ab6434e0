// MIT License - Copyright (c) 2026 The lora-sentinel authors

/// All errors that can occur in the lora-sentinel library.
///
/// Nothing in the coordination core propagates these to a caller: every
/// failure is either logged-and-continued or resolved by a mode transition.
/// The variants exist so trait seams (radio, storage, access point,
/// notifier) can report what went wrong in a uniform way.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("radio transport error: {details}")]
    Radio { details: String },

    #[error("radio is busy transmitting")]
    RadioBusy,

    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("config store error for entry '{entry}': {source}")]
    Storage {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("access point failed to start: {reason}")]
    AccessPoint { reason: String },

    #[error("notification dispatch failed: {reason}")]
    Notify { reason: String },
}

impl SentinelError {
    /// Whether this error is transient: the next loop iteration may succeed
    /// without any corrective action beyond retrying naturally.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SentinelError::Io(_)
                | SentinelError::Radio { .. }
                | SentinelError::RadioBusy
                | SentinelError::Notify { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SentinelError::Radio { details: "tx failed".into() }.is_transient());
        assert!(SentinelError::RadioBusy.is_transient());
        assert!(SentinelError::Notify { reason: "broker down".into() }.is_transient());
        assert!(!SentinelError::AccessPoint { reason: "no iface".into() }.is_transient());
    }
}
