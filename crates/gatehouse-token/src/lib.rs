//! # Gatehouse Token
//!
//! Opaque, authenticated and expiring bearer credentials.
//!
//! - [`TokenCodec`] - Issues and verifies credentials under one symmetric key
//! - [`TokenKind`] - Access or refresh; verification states which it expects
//! - [`CredentialVerifier`] - The capability the authentication stage depends on
//!
//! ## Example
//!
//! ```
//! use gatehouse_core::Role;
//! use gatehouse_token::{TokenCodec, TokenError, TokenKind};
//! use std::time::Duration;
//!
//! let codec = TokenCodec::new(&[1u8; 32])?;
//! let refresh = codec.issue("42", Role::Owner, TokenKind::Refresh, Duration::from_secs(3600))?;
//!
//! assert_eq!(
//!     codec.verify(refresh.as_str(), TokenKind::Access),
//!     Err(TokenError::WrongType)
//! );
//! # Ok::<(), TokenError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/gatehouse-token/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod claims;
mod codec;
mod error;

pub use claims::{Claims, TokenKind};
pub use codec::{Credential, TokenCodec, HEADER, KEY_LEN};
pub use error::TokenError;

use gatehouse_core::Identity;

/// Verifies a raw bearer credential.
///
/// Implemented by [`TokenCodec`]. The authentication stage holds this trait
/// object rather than the codec so tests can substitute a counting verifier.
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Verifies `raw`, expecting a credential of kind `expected`.
    fn verify(&self, raw: &str, expected: TokenKind) -> Result<Identity, TokenError>;
}
