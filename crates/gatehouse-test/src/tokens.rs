//! Credentials for tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gatehouse_core::Role;
use gatehouse_token::{CredentialVerifier, TokenCodec, TokenKind};

use crate::error::TestError;

/// Lifetime of credentials issued by [`TokenFactory`].
pub const TEST_TOKEN_TTL: Duration = Duration::from_secs(300);

const SUBJECT: &str = "test";

/// Issues credentials under one key and hands out the matching verifier.
#[derive(Clone)]
pub struct TokenFactory {
    codec: Arc<TokenCodec>,
}

impl TokenFactory {
    /// Creates a factory for `key`.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Credential` unless `key` is 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, TestError> {
        Ok(Self {
            codec: Arc::new(TokenCodec::new(key)?),
        })
    }

    /// Verifier to hand to [`gatehouse_middleware::Pipeline::builder`].
    #[must_use]
    pub fn verifier(&self) -> Arc<dyn CredentialVerifier> {
        Arc::clone(&self.codec) as Arc<dyn CredentialVerifier>
    }

    /// An access credential for a fixed test subject.
    pub fn access(&self, role: Role) -> Result<String, TestError> {
        self.access_for(SUBJECT, role)
    }

    /// An access credential for `subject`.
    pub fn access_for(&self, subject: &str, role: Role) -> Result<String, TestError> {
        self.issue(subject, role, TokenKind::Access)
    }

    /// A refresh credential. The pipeline rejects it.
    pub fn refresh(&self, role: Role) -> Result<String, TestError> {
        self.issue(SUBJECT, role, TokenKind::Refresh)
    }

    /// An access credential that expired a minute ago.
    pub fn expired(&self, role: Role) -> Result<String, TestError> {
        let issued = Utc::now() - chrono::Duration::seconds(360);
        Ok(self
            .codec
            .issue_at(SUBJECT, role, TokenKind::Access, TEST_TOKEN_TTL, issued)?
            .into_string())
    }

    fn issue(&self, subject: &str, role: Role, kind: TokenKind) -> Result<String, TestError> {
        Ok(self
            .codec
            .issue(subject, role, kind, TEST_TOKEN_TTL)?
            .into_string())
    }
}

impl std::fmt::Debug for TokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenFactory").finish_non_exhaustive()
    }
}
