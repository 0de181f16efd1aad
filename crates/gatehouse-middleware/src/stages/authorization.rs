//! Role-based authorization.
//!
//! Compares the caller's role with the [`RoleSet`] declared on the matched
//! route. `Superuser` is admitted everywhere.

use gatehouse_core::{ApiError, Identity, RoleSet};

/// Checks a verified identity against a route's allowed roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Creates a gate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Admits or rejects `identity` for a route allowing `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] if the role is not admitted.
    pub fn check(&self, identity: &Identity, allowed: RoleSet) -> Result<(), ApiError> {
        if allowed.admits(identity.role()) {
            Ok(())
        } else {
            tracing::debug!(
                caller = %identity.log_id(),
                allowed = allowed.bits(),
                "Role not admitted by route"
            );
            Err(ApiError::Forbidden)
        }
    }
}
