//! Bearer credential authentication.
//!
//! Reads the `Authorization` header, expects `Bearer <credential>` and asks a
//! [`CredentialVerifier`] to verify it as an access credential. Every failure
//! reason collapses to [`ApiError::Unauthorized`]; the reason itself is only
//! logged.
//!
//! Runs inside the dispatcher, after the shutdown gate and before routing:
//!
//! ```text
//! ShutdownGate → [Authentication] → Routing → Authorization → Handler
//! ```

use gatehouse_core::{ApiError, Identity};
use gatehouse_token::{CredentialVerifier, TokenKind};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use std::sync::Arc;

const BEARER: &str = "bearer";

/// Resolves the caller's [`Identity`] from request headers.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authenticator {
    /// Creates an authenticator backed by `verifier`.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Authenticates a request from its headers.
    ///
    /// The scheme is matched case-insensitively. Fields after the credential
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the header is missing, not
    /// `Bearer`, or the credential fails verification.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, ApiError> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            tracing::debug!("Missing authorization header");
            return Err(ApiError::Unauthorized);
        };

        let Ok(value) = value.to_str() else {
            tracing::debug!("Authorization header is not visible ASCII");
            return Err(ApiError::Unauthorized);
        };

        let mut fields = value.split_whitespace();
        let (Some(scheme), Some(credential)) = (fields.next(), fields.next()) else {
            tracing::debug!("Authorization header has fewer than two fields");
            return Err(ApiError::Unauthorized);
        };

        if !scheme.eq_ignore_ascii_case(BEARER) {
            tracing::debug!(scheme, "Unsupported authorization scheme");
            return Err(ApiError::Unauthorized);
        }

        match self.verifier.verify(credential, TokenKind::Access) {
            Ok(identity) => Ok(identity),
            Err(reason) => {
                tracing::debug!(%reason, "Credential rejected");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::Role;
    use gatehouse_token::TokenCodec;
    use http::HeaderValue;
    use std::time::Duration;

    const KEY: [u8; 32] = [9u8; 32];

    fn authenticator() -> (Authenticator, TokenCodec) {
        let codec = TokenCodec::new(&KEY).unwrap();
        (Authenticator::new(Arc::new(TokenCodec::new(&KEY).unwrap())), codec)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_access_credential() {
        let (auth, codec) = authenticator();
        let credential = codec
            .issue("17", Role::Admin, TokenKind::Access, Duration::from_secs(60))
            .unwrap();

        let identity = auth
            .authenticate(&headers(&format!("Bearer {}", credential.as_str())))
            .unwrap();
        assert_eq!(identity.subject(), "17");
        assert_eq!(identity.role(), Role::Admin);
    }

    #[test]
    fn test_scheme_is_case_insensitive_and_extra_fields_ignored() {
        let (auth, codec) = authenticator();
        let credential = codec
            .issue("17", Role::Viewer, TokenKind::Access, Duration::from_secs(60))
            .unwrap();

        let identity = auth
            .authenticate(&headers(&format!("bEaReR {} trailing", credential.as_str())))
            .unwrap();
        assert_eq!(identity.role(), Role::Viewer);
    }

    #[test]
    fn test_missing_header() {
        let (auth, _) = authenticator();
        assert!(matches!(
            auth.authenticate(&HeaderMap::new()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_malformed_headers() {
        let (auth, _) = authenticator();
        for value in ["Bearer", "", "Basic dXNlcjpwYXNz", "Bearer not-a-credential"] {
            assert!(
                matches!(auth.authenticate(&headers(value)), Err(ApiError::Unauthorized)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_refresh_credential_rejected() {
        let (auth, codec) = authenticator();
        let refresh = codec
            .issue("17", Role::Admin, TokenKind::Refresh, Duration::from_secs(60))
            .unwrap();

        assert!(matches!(
            auth.authenticate(&headers(&format!("Bearer {}", refresh.as_str()))),
            Err(ApiError::Unauthorized)
        ));
    }
}
