//! IDENTITIES & ROSTER
//!
//! The roster is the fixed set of demo accounts known at startup. It is built
//! once, validated once, and never mutated afterwards; sessions hold shared
//! references into it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Role carried by an identity record. There is no `Public` here: public is a
/// viewer state, not an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityRole {
    Admin,
    User,
}

impl fmt::Display for IdentityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityRole::Admin => f.write_str("admin"),
            IdentityRole::User => f.write_str("user"),
        }
    }
}

/// A demo account holder or administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    /// Placeholder address, not backed by any key.
    pub wallet_address: String,
    pub role: IdentityRole,
    pub location_label: String,
    /// Litres per month.
    pub monthly_usage: f64,
    pub bill_count: u32,
    pub avatar_glyph: String,
}

impl Identity {
    /// `0x1234...7890` form used in compact headers. Counts characters, not
    /// bytes, so any address string is safe.
    pub fn short_address(&self) -> String {
        let addr = &self.wallet_address;
        let len = addr.chars().count();
        if len <= 10 {
            return addr.clone();
        }
        let head: String = addr.chars().take(6).collect();
        let tail: String = addr.chars().skip(len - 4).collect();
        format!("{head}...{tail}")
    }

    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.display_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == IdentityRole::Admin
    }
}

/// Fixed, validated list of identities.
#[derive(Debug, Clone)]
pub struct Roster {
    identities: Vec<Arc<Identity>>,
    // Index of the only administrator; fixed at construction.
    admin: usize,
}

impl Roster {
    /// Builds a roster from a custom list.
    ///
    /// Rejects an empty list, duplicate ids, and any list that does not contain
    /// exactly one administrator.
    pub fn new(identities: Vec<Identity>) -> Result<Self, WalletError> {
        if identities.is_empty() {
            return Err(WalletError::InvalidRoster("roster is empty".into()));
        }

        let mut seen = HashSet::new();
        for identity in &identities {
            if !seen.insert(identity.id.as_str()) {
                return Err(WalletError::InvalidRoster(format!(
                    "duplicate identity id {}",
                    identity.id
                )));
            }
        }

        let admins: Vec<usize> = identities
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_admin())
            .map(|(idx, _)| idx)
            .collect();
        let [admin] = admins[..] else {
            return Err(WalletError::InvalidRoster(format!(
                "expected exactly one admin, found {}",
                admins.len()
            )));
        };

        Ok(Self {
            identities: identities.into_iter().map(Arc::new).collect(),
            admin,
        })
    }

    /// The eleven built-in demo accounts: one administrator followed by ten
    /// residents.
    pub fn builtin() -> Self {
        let identities = BUILTIN
            .iter()
            .map(|row| Identity {
                id: row.0.to_string(),
                display_name: row.1.to_string(),
                wallet_address: row.2.to_string(),
                role: row.3,
                location_label: row.4.to_string(),
                monthly_usage: row.5,
                bill_count: row.6,
                avatar_glyph: row.7.to_string(),
            })
            .map(Arc::new)
            .collect();
        // BUILTIN lists the administrator first.
        Self { identities, admin: 0 }
    }

    pub fn find(&self, id: &str) -> Option<&Arc<Identity>> {
        self.identities.iter().find(|i| i.id == id)
    }

    pub fn identities(&self) -> &[Arc<Identity>] {
        &self.identities
    }

    pub fn admin(&self) -> &Arc<Identity> {
        &self.identities[self.admin]
    }

    /// Identities with the `user` role, in roster order.
    pub fn residents(&self) -> impl Iterator<Item = &Arc<Identity>> {
        self.identities.iter().filter(|i| !i.is_admin())
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

type Row = (
    &'static str,
    &'static str,
    &'static str,
    IdentityRole,
    &'static str,
    f64,
    u32,
    &'static str,
);

const BUILTIN: &[Row] = &[
    ("admin-001", "Sarah Johnson", "0x1234567890123456789012345678901234567890", IdentityRole::Admin, "Water Authority HQ", 0.0, 0, "👩‍💼"),
    ("user-001", "John Smith", "0x2345678901234567890123456789012345678901", IdentityRole::User, "Residential District A", 1250.0, 3, "👨‍💻"),
    ("user-002", "Maria Garcia", "0x3456789012345678901234567890123456789012", IdentityRole::User, "Commercial Center", 2100.0, 3, "👩‍🏫"),
    ("user-003", "David Chen", "0x4567890123456789012345678901234567890123", IdentityRole::User, "Residential District B", 980.0, 3, "👨‍🔬"),
    ("user-004", "Emily Brown", "0x5678901234567890123456789012345678901234", IdentityRole::User, "Industrial Zone", 3200.0, 3, "👩‍🔧"),
    ("user-005", "Michael Wilson", "0x6789012345678901234567890123456789012345", IdentityRole::User, "Residential District A", 1450.0, 3, "👨‍🎨"),
    ("user-006", "Lisa Anderson", "0x7890123456789012345678901234567890123456", IdentityRole::User, "Commercial Center", 1800.0, 3, "👩‍⚕️"),
    ("user-007", "Robert Taylor", "0x8901234567890123456789012345678901234567", IdentityRole::User, "Residential District B", 1100.0, 3, "👨‍🍳"),
    ("user-008", "Jennifer Lee", "0x9012345678901234567890123456789012345678", IdentityRole::User, "Industrial Zone", 2800.0, 3, "👩‍🎤"),
    ("user-009", "Thomas Martinez", "0xa123456789012345678901234567890123456789", IdentityRole::User, "Residential District A", 1350.0, 3, "👨‍🏫"),
    ("user-010", "Amanda Davis", "0xb234567890123456789012345678901234567890", IdentityRole::User, "Commercial Center", 1950.0, 3, "👩‍💼"),
];
