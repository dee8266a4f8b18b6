use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, IdentityRole};

/// Who is looking at the dashboard. Derived from the session, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    Public,
    User,
    Admin,
}

impl ViewerRole {
    /// `Public` unless connected with an active identity, in which case the
    /// identity's role is mirrored exactly.
    pub fn derive(connected: bool, identity: Option<&Identity>) -> Self {
        match (connected, identity) {
            (true, Some(identity)) => identity.role.into(),
            _ => ViewerRole::Public,
        }
    }

    /// Header label shown next to the connection badge.
    pub fn label(&self) -> &'static str {
        match self {
            ViewerRole::Public => "Public",
            ViewerRole::User => "User",
            ViewerRole::Admin => "Administrator",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, ViewerRole::Admin)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, ViewerRole::Public)
    }
}

impl From<IdentityRole> for ViewerRole {
    fn from(role: IdentityRole) -> Self {
        match role {
            IdentityRole::Admin => ViewerRole::Admin,
            IdentityRole::User => ViewerRole::User,
        }
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerRole::Public => f.write_str("public"),
            ViewerRole::User => f.write_str("user"),
            ViewerRole::Admin => f.write_str("admin"),
        }
    }
}
