//! Credential payload.

use chrono::{DateTime, Utc};
use gatehouse_core::{Identity, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared purpose of a credential.
///
/// A verifier states which kind it expects; a credential of any other kind is
/// rejected even if it is otherwise valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential presented on every request.
    Access,
    /// Long-lived credential exchanged for new access credentials.
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        })
    }
}

/// The sealed claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Unique token ID.
    pub id: Uuid,
    /// Subject the credential was issued to.
    pub subject: String,
    /// Role claim.
    pub role: Role,
    /// Declared kind.
    pub kind: TokenKind,
    /// Issuance time.
    pub issued_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Returns `true` once `now` is past the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Builds the request identity carried by these claims.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.subject.clone(), self.role)
    }
}
