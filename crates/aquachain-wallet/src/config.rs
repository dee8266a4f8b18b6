use serde::{Deserialize, Serialize};

/// Identity picked by `connect_default`.
pub const DEFAULT_IDENTITY_ID: &str = "user-001";
/// Cosmetic balance bounds, ETH.
pub const MIN_BALANCE: f64 = 1.0;
pub const MAX_BALANCE: f64 = 11.0;

/// Tunables for the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub default_identity: String,
    pub min_balance: f64,
    pub max_balance: f64,
}

impl WalletConfig {
    /// Falls back to the built-in range when the configured one is empty or
    /// inverted.
    pub fn balance_range(&self) -> std::ops::Range<f64> {
        if self.min_balance.is_finite()
            && self.max_balance.is_finite()
            && self.min_balance < self.max_balance
        {
            self.min_balance..self.max_balance
        } else {
            MIN_BALANCE..MAX_BALANCE
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            default_identity: DEFAULT_IDENTITY_ID.to_string(),
            min_balance: MIN_BALANCE,
            max_balance: MAX_BALANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_range_falls_back() {
        let config = WalletConfig {
            min_balance: 5.0,
            max_balance: 2.0,
            ..WalletConfig::default()
        };
        assert_eq!(config.balance_range(), MIN_BALANCE..MAX_BALANCE);
    }
}
