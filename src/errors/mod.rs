use thiserror::Error;

/// Per-match failure reported by the retrieval layer.
///
/// `Clone` is required so a single in-flight fetch outcome can be handed to
/// every caller waiting on the same match id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transient upstream failure: timeout, connection error, rate limit
    /// or a 5xx response. Eligible for retry.
    #[error("match service unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// The match id does not exist upstream. Permanent, never retried.
    #[error("match {0} not found upstream")]
    NotFound(i64),
}

impl FetchError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_unavailable_is_transient() {
        assert!(FetchError::unavailable("timeout").is_transient());
        assert!(!FetchError::NotFound(42).is_transient());
    }
}
