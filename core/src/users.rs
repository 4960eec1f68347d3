//! Users, roles and the capabilities they grant.
//!
//! Handlers never compare role strings; they ask whether the caller holds
//! a capability. Roles are just named capability sets.

use crate::error::Error;
use crate::store::{StoreError, StoreFuture};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if `raw` is not a well-formed
    /// identifier.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::InvalidReference("Invalid user ID format.".to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something a caller is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Read the caller's own orders.
    ReadOwnOrders,
    /// Read any order and list all orders.
    ReadAllOrders,
    /// Record payments and deliveries on orders.
    MutateOrderStatus,
    /// Add, change and soft-delete catalog entries.
    ManageCatalog,
}

/// Account roles. A role is nothing more than a capability set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    Customer,
    /// Store operator.
    Admin,
}

impl Role {
    /// Capabilities this role grants.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Customer => &[Capability::ReadOwnOrders],
            Self::Admin => &[
                Capability::ReadOwnOrders,
                Capability::ReadAllOrders,
                Capability::MutateOrderStatus,
                Capability::ManageCatalog,
            ],
        }
    }

    /// Whether this role grants the capability.
    #[must_use]
    pub fn grants(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// An authenticated account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Role, resolved to capabilities.
    pub role: Role,
}

impl User {
    /// Whether this user holds the capability.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    /// Requires the capability, failing with `Forbidden` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] when the user lacks the capability.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "Only administrators are allowed to perform this action.".to_string(),
            ))
        }
    }
}

/// Lookup of authenticated users.
///
/// Token issuance lives elsewhere; this trait only resolves an opaque
/// bearer token or a user id to an account.
pub trait UserDirectory: Send + Sync {
    /// Resolves an opaque bearer token to a user.
    fn find_by_token<'a>(
        &'a self,
        token: &'a str,
    ) -> StoreFuture<'a, Result<Option<User>, StoreError>>;

    /// Looks up a user by id.
    fn find(&self, id: UserId) -> StoreFuture<'_, Result<Option<User>, StoreError>>;
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect
mod tests {
    use super::*;

    #[test]
    fn customers_only_read_their_own_orders() {
        assert!(Role::Customer.grants(Capability::ReadOwnOrders));
        assert!(!Role::Customer.grants(Capability::ReadAllOrders));
        assert!(!Role::Customer.grants(Capability::MutateOrderStatus));
        assert!(!Role::Customer.grants(Capability::ManageCatalog));
    }

    #[test]
    fn admins_hold_every_capability() {
        for capability in [
            Capability::ReadOwnOrders,
            Capability::ReadAllOrders,
            Capability::MutateOrderStatus,
            Capability::ManageCatalog,
        ] {
            assert!(Role::Admin.grants(capability));
        }
    }

    #[test]
    fn require_returns_forbidden() {
        let user = User {
            id: UserId::generate(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role: Role::Customer,
        };
        let err = user
            .require(Capability::MutateOrderStatus)
            .expect_err("customer must not mutate order status");
        assert_eq!(err.status_code(), 403);
    }
}
