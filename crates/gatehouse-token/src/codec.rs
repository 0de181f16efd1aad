//! Issuing and verifying sealed credentials.
//!
//! # Wire format
//!
//! ```text
//! gh1.local.<base64url(nonce || ciphertext || tag)>
//! ```
//!
//! The payload is the JSON-encoded [`Claims`], sealed with XChaCha20-Poly1305
//! under a 32-byte key and a fresh random 24-byte nonce. The header is bound
//! as associated data, so a credential cannot be replayed under a different
//! version prefix.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Utc};
use gatehouse_core::{Identity, Role};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{Claims, CredentialVerifier, TokenError, TokenKind};

/// Version header prefixed to every credential.
pub const HEADER: &str = "gh1.local.";

/// Required symmetric key length in bytes.
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// An issued credential together with the claims it seals.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    raw: String,
    claims: Claims,
}

impl Credential {
    /// Returns the wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the sealed claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Returns the absolute expiry.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }

    /// Consumes the credential and returns the wire form.
    #[must_use]
    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("raw", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Seals and opens credentials under one symmetric key.
///
/// The codec holds no mutable state, so a single instance can be shared by
/// every request task.
///
/// # Example
///
/// ```
/// use gatehouse_core::Role;
/// use gatehouse_token::{TokenCodec, TokenKind};
/// use std::time::Duration;
///
/// let codec = TokenCodec::new(&[7u8; 32]).unwrap();
/// let credential = codec
///     .issue("42", Role::Admin, TokenKind::Access, Duration::from_secs(900))
///     .unwrap();
///
/// let identity = codec.verify(credential.as_str(), TokenKind::Access).unwrap();
/// assert_eq!(identity.subject(), "42");
/// ```
pub struct TokenCodec {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl TokenCodec {
    /// Creates a codec from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKeyLength`] unless `key` is exactly
    /// [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key: [u8; KEY_LEN] = key.try_into().map_err(|_| TokenError::InvalidKeyLength)?;
        Ok(Self {
            key: Zeroizing::new(key),
        })
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(self.key.as_slice()))
    }

    /// Issues a credential valid for `ttl` from now.
    pub fn issue(
        &self,
        subject: impl Into<String>,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<Credential, TokenError> {
        self.issue_at(subject, role, kind, ttl, Utc::now())
    }

    /// Issues a credential as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: impl Into<String>,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Credential, TokenError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::Issue)?;
        let expires_at = now.checked_add_signed(ttl).ok_or(TokenError::Issue)?;
        let claims = Claims {
            id: Uuid::now_v7(),
            subject: subject.into(),
            role,
            kind,
            issued_at: now,
            expires_at,
        };

        let plaintext = Zeroizing::new(serde_json::to_vec(&claims).map_err(|_| TokenError::Issue)?);
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher()
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_slice(),
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Issue)?;

        let mut body = Vec::with_capacity(NONCE_LEN + sealed.len());
        body.extend_from_slice(nonce.as_slice());
        body.extend_from_slice(&sealed);

        let mut raw = String::with_capacity(HEADER.len() + body.len() * 4 / 3 + 4);
        raw.push_str(HEADER);
        URL_SAFE_NO_PAD.encode_string(&body, &mut raw);

        Ok(Credential { raw, claims })
    }

    /// Verifies `raw` and returns the identity it carries.
    pub fn verify(&self, raw: &str, expected: TokenKind) -> Result<Identity, TokenError> {
        self.verify_at(raw, expected, Utc::now())
    }

    /// Verifies `raw` as if the current time were `now`.
    pub fn verify_at(
        &self,
        raw: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Identity, TokenError> {
        self.decode_at(raw, expected, now).map(|claims| claims.identity())
    }

    /// Verifies `raw` and returns the full claim set.
    ///
    /// Checks run in order: structure, authentication, payload shape, kind,
    /// expiry. The first failure is returned.
    pub fn decode_at(
        &self,
        raw: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let encoded = raw.strip_prefix(HEADER).ok_or(TokenError::Malformed)?;
        let body = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::Malformed)?;
        if body.len() < NONCE_LEN + TAG_LEN {
            return Err(TokenError::Malformed);
        }

        let (nonce, sealed) = body.split_at(NONCE_LEN);
        let plaintext = Zeroizing::new(
            self.cipher()
                .decrypt(
                    XNonce::from_slice(nonce),
                    Payload {
                        msg: sealed,
                        aad: HEADER.as_bytes(),
                    },
                )
                .map_err(|_| TokenError::Invalid)?,
        );

        let claims: Claims =
            serde_json::from_slice(plaintext.as_slice()).map_err(|_| TokenError::Malformed)?;
        if claims.kind != expected {
            return Err(TokenError::WrongType);
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").field("key", &"<redacted>").finish()
    }
}

impl CredentialVerifier for TokenCodec {
    fn verify(&self, raw: &str, expected: TokenKind) -> Result<Identity, TokenError> {
        Self::verify(self, raw, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [0x2a; KEY_LEN];
    const TTL: Duration = Duration::from_secs(15 * 60);

    fn codec() -> TokenCodec {
        TokenCodec::new(&KEY).unwrap()
    }

    fn encode(bytes: &[u8]) -> String {
        format!("{HEADER}{}", URL_SAFE_NO_PAD.encode(bytes))
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec();
        let credential = codec
            .issue("42", Role::Operator, TokenKind::Access, TTL)
            .unwrap();
        assert!(credential.as_str().starts_with(HEADER));

        let identity = codec.verify(credential.as_str(), TokenKind::Access).unwrap();
        assert_eq!(identity, Identity::new("42", Role::Operator));
    }

    #[test]
    fn test_verify_twice_yields_same_identity() {
        let codec = codec();
        let credential = codec.issue("7", Role::Admin, TokenKind::Access, TTL).unwrap();
        let first = codec.verify(credential.as_str(), TokenKind::Access).unwrap();
        let second = codec.verify(credential.as_str(), TokenKind::Access).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_key_length_enforced() {
        assert_eq!(
            TokenCodec::new(&[0u8; 31]).unwrap_err(),
            TokenError::InvalidKeyLength
        );
        assert_eq!(
            TokenCodec::new(&[0u8; 33]).unwrap_err(),
            TokenError::InvalidKeyLength
        );
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let codec = codec();
        let refresh = codec.issue("1", Role::Admin, TokenKind::Refresh, TTL).unwrap();
        assert_eq!(
            codec.verify(refresh.as_str(), TokenKind::Access).unwrap_err(),
            TokenError::WrongType
        );

        let access = codec.issue("1", Role::Admin, TokenKind::Access, TTL).unwrap();
        assert_eq!(
            codec.verify(access.as_str(), TokenKind::Refresh).unwrap_err(),
            TokenError::WrongType
        );
    }

    #[test]
    fn test_expiry() {
        let codec = codec();
        let issued = Utc::now() - chrono::Duration::hours(1);
        let credential = codec
            .issue_at("1", Role::Admin, TokenKind::Access, TTL, issued)
            .unwrap();

        assert_eq!(
            codec.verify(credential.as_str(), TokenKind::Access).unwrap_err(),
            TokenError::Expired
        );

        let at_expiry = credential.expires_at();
        assert!(codec
            .verify_at(credential.as_str(), TokenKind::Access, at_expiry)
            .is_ok());
        assert_eq!(
            codec
                .verify_at(
                    credential.as_str(),
                    TokenKind::Access,
                    at_expiry + chrono::Duration::seconds(1)
                )
                .unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_wrong_type_reported_before_expiry() {
        let codec = codec();
        let issued = Utc::now() - chrono::Duration::days(30);
        let credential = codec
            .issue_at("1", Role::Admin, TokenKind::Refresh, TTL, issued)
            .unwrap();
        assert_eq!(
            codec.verify(credential.as_str(), TokenKind::Access).unwrap_err(),
            TokenError::WrongType
        );
    }

    #[test]
    fn test_different_key_is_invalid() {
        let credential = codec()
            .issue("1", Role::Admin, TokenKind::Access, TTL)
            .unwrap();
        let other = TokenCodec::new(&[0x01; KEY_LEN]).unwrap();
        assert_eq!(
            other.verify(credential.as_str(), TokenKind::Access).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_structural_failures_are_malformed() {
        let codec = codec();
        let credential = codec.issue("1", Role::Admin, TokenKind::Access, TTL).unwrap();
        let body = credential.as_str().strip_prefix(HEADER).unwrap();

        for raw in [
            String::new(),
            format!("gh2.local.{body}"),
            format!("{HEADER}***not-base64***"),
            encode(&[0u8; NONCE_LEN + TAG_LEN - 1]),
        ] {
            assert_eq!(
                codec.verify(&raw, TokenKind::Access).unwrap_err(),
                TokenError::Malformed,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_sealed_garbage_is_malformed() {
        let codec = codec();
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = codec
            .cipher()
            .encrypt(
                &nonce,
                Payload {
                    msg: b"{\"not\":\"claims\"}",
                    aad: HEADER.as_bytes(),
                },
            )
            .unwrap();
        let mut body = nonce.to_vec();
        body.extend_from_slice(&sealed);

        assert_eq!(
            codec.verify(&encode(&body), TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_tampered_ciphertext_is_invalid() {
        let codec = codec();
        let credential = codec.issue("1", Role::Admin, TokenKind::Access, TTL).unwrap();
        let mut body = URL_SAFE_NO_PAD
            .decode(credential.as_str().strip_prefix(HEADER).unwrap())
            .unwrap();
        let last = body.len() - 1;
        body[last] ^= 0x01;

        assert_eq!(
            codec.verify(&encode(&body), TokenKind::Access).unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_nonces_are_fresh() {
        let codec = codec();
        let a = codec.issue("1", Role::Admin, TokenKind::Access, TTL).unwrap();
        let b = codec.issue("1", Role::Admin, TokenKind::Access, TTL).unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("42"));
    }
}
