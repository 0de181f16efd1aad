//! Credential error types.

use thiserror::Error;

/// Errors returned when issuing or verifying a credential.
///
/// Messages are deliberately generic: none of them reveals which
/// cryptographic check failed or any part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The credential is not structurally a credential.
    #[error("credential is malformed")]
    Malformed,

    /// The credential failed authentication.
    #[error("credential is invalid")]
    Invalid,

    /// The credential is of a different kind than the caller expects.
    #[error("credential has the wrong type")]
    WrongType,

    /// The credential is past its expiry.
    #[error("credential has expired")]
    Expired,

    /// The symmetric key is not exactly 32 bytes.
    #[error("symmetric key must be exactly 32 bytes")]
    InvalidKeyLength,

    /// The credential could not be sealed.
    #[error("credential could not be issued")]
    Issue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(TokenError::Expired.to_string(), "credential has expired");
        assert_eq!(
            TokenError::InvalidKeyLength.to_string(),
            "symmetric key must be exactly 32 bytes"
        );
    }
}
