//! Caller identity supplied by the external identity provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UserId;

/// An authenticated caller.
///
/// The storefront never authenticates anyone itself; the transport layer
/// builds an `Identity` from whatever the identity provider asserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub is_admin: bool,
}

/// Returned when an admin-only operation is attempted by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user {user_id} is not an administrator")]
pub struct NotAdmin {
    pub user_id: UserId,
}

impl Identity {
    pub fn customer(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    /// Fails unless the caller holds the admin role.
    pub fn require_admin(&self) -> Result<(), NotAdmin> {
        if self.is_admin {
            Ok(())
        } else {
            Err(NotAdmin {
                user_id: self.user_id.clone(),
            })
        }
    }

    /// True if the caller may read a resource owned by `owner`.
    pub fn can_read(&self, owner: &UserId) -> bool {
        self.is_admin || &self.user_id == owner
    }
}
