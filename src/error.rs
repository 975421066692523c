use solana_client::client_error::ClientError;
use thiserror::Error;

/// Credential-state violations surfaced by session authorization.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("session not found")]
    NotFound,

    #[error("session is inactive")]
    Inactive,

    #[error("session has expired")]
    Expired,

    #[error("session usage limit exhausted")]
    Exhausted,
}

/// Error taxonomy for every public SDK operation.
///
/// Validation and authorization failures are caller errors and are never
/// retried. Network and relay failures during confirmation polling are
/// retried internally before a `Timeout` or `Relay` error is surfaced.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("no signing authority available: {0}")]
    Authority(String),

    #[error("authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("rate limit exceeded: {limit} requests per minute")]
    RateLimit { limit: u32 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("confirmation timeout: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(Box<ClientError>),
}

impl From<ClientError> for SdkError {
    fn from(err: ClientError) -> Self {
        Self::Network(Box::new(err))
    }
}

impl SdkError {
    /// Whether this error is a credential-state violation of the given kind.
    pub fn is_authorization(&self, kind: AuthorizationError) -> bool {
        matches!(self, Self::Authorization(k) if *k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let err = SdkError::Authority("no delegator configured".to_string());
        assert!(format!("{}", err).contains("no delegator configured"));

        let err = SdkError::Authorization(AuthorizationError::Expired);
        assert_eq!(format!("{}", err), "authorization failed: session has expired");

        let err = SdkError::RateLimit { limit: 60 };
        assert!(format!("{}", err).contains("60 requests per minute"));
    }

    #[test]
    fn test_authorization_kind_matching() {
        let err = SdkError::Authorization(AuthorizationError::Exhausted);
        assert!(err.is_authorization(AuthorizationError::Exhausted));
        assert!(!err.is_authorization(AuthorizationError::NotFound));

        let err = SdkError::Validation("oversized bundle".to_string());
        assert!(!err.is_authorization(AuthorizationError::Inactive));
    }
}
