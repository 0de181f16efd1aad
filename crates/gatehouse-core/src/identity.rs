//! Caller identity and access tiers.
//!
//! An [`Identity`] exists only after a credential has been verified. It is
//! created once per request, passed by reference to the authorization gate and
//! the handler, and dropped when the request ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Capability tier carried in a credential.
///
/// The set is closed. Each role owns one bit of a [`RoleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Admitted by every route.
    Superuser,
    /// Account owner.
    Owner,
    /// Administrator.
    Admin,
    /// Dispatch operator.
    Operator,
    /// Driver.
    Driver,
    /// Read-only staff.
    Viewer,
    /// End customer.
    Client,
}

impl Role {
    /// Every role, in bit order.
    pub const ALL: [Self; 7] = [
        Self::Superuser,
        Self::Owner,
        Self::Admin,
        Self::Operator,
        Self::Driver,
        Self::Viewer,
        Self::Client,
    ];

    /// Returns the role's bit index inside a [`RoleSet`].
    #[must_use]
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns the lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superuser => "superuser",
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Driver => "driver",
            Self::Viewer => "viewer",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// A set of roles stored as a bitmask.
///
/// # Example
///
/// ```
/// use gatehouse_core::{Role, RoleSet};
///
/// assert!(RoleSet::ADMIN_TIER.admits(Role::Driver));
/// assert!(!RoleSet::ADMIN_TIER.admits(Role::Viewer));
/// assert!(RoleSet::SUPERUSER_ONLY.admits(Role::Superuser));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u16);

impl RoleSet {
    /// No explicit members. Only the superuser is admitted.
    pub const SUPERUSER_ONLY: Self = Self(0);

    /// Staff roles allowed to manage resources.
    pub const ADMIN_TIER: Self = Self::empty()
        .with(Role::Superuser)
        .with(Role::Owner)
        .with(Role::Admin)
        .with(Role::Operator)
        .with(Role::Driver);

    /// Every role.
    pub const ANY: Self = Self::ADMIN_TIER.with(Role::Viewer).with(Role::Client);

    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy of this set with `role` added.
    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// Returns `true` if `role` is an explicit member.
    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Returns `true` if a caller with `role` may pass.
    ///
    /// `Superuser` is admitted by every set, including the empty one.
    #[must_use]
    pub const fn admits(self, role: Role) -> bool {
        matches!(role, Role::Superuser) || self.contains(role)
    }

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Verified caller identity.
///
/// Immutable once built; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    subject: String,
    role: Role,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// Returns the subject ID.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns a string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("{}:{}", self.role, self.subject)
    }
}
