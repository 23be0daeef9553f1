//! Common types and tree configuration.

use crate::error::{BTreeError, Result};
use serde::{Deserialize, Serialize};

/// Smallest supported number of keys per node
pub const MIN_KEY_CAPACITY: usize = 2;

/// Largest supported number of keys per node
pub const MAX_KEY_CAPACITY: usize = 1000;

/// Key capacity used when none is specified (a 2-3-4 style tree)
pub const DEFAULT_KEY_CAPACITY: usize = 3;

/// BTree configuration for the per-node key limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BTreeConfig {
    /// Maximum keys per node
    pub key_capacity: usize,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            key_capacity: DEFAULT_KEY_CAPACITY,
        }
    }
}

impl BTreeConfig {
    /// Create a new config, rejecting capacities outside
    /// `MIN_KEY_CAPACITY..=MAX_KEY_CAPACITY`
    pub fn new(key_capacity: usize) -> Result<Self> {
        let config = Self { key_capacity };
        config.validate()?;
        Ok(config)
    }

    /// Check that the capacity is within the supported range
    ///
    /// Configs built through serde bypass `new`, so the tree calls this too.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KEY_CAPACITY..=MAX_KEY_CAPACITY).contains(&self.key_capacity) {
            return Err(BTreeError::CapacityOutOfRange {
                requested: self.key_capacity,
                min: MIN_KEY_CAPACITY,
                max: MAX_KEY_CAPACITY,
            });
        }
        Ok(())
    }

    /// Minimum degree `t`: every non-root node keeps at least `t - 1` keys
    pub fn min_degree(&self) -> usize {
        min_degree(self.key_capacity)
    }

    /// When this capacity lets the tree repair nodes
    pub fn rebalance(&self) -> Rebalance {
        Rebalance::for_capacity(self.key_capacity)
    }
}

/// Point at which inserts and removals restore node occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rebalance {
    /// Full children are split and minimal children filled before the
    /// operation descends into them. Used for odd capacities, where a full
    /// node splits into two minimal halves.
    TopDown,
    /// Overflowing or underflowing children are repaired after the
    /// recursive call returns. Used for even capacities, where splitting a
    /// full node would leave one half below the minimum.
    BottomUp,
}

impl Rebalance {
    pub fn for_capacity(key_capacity: usize) -> Self {
        if key_capacity % 2 == 1 {
            Self::TopDown
        } else {
            Self::BottomUp
        }
    }
}

/// Minimum degree `t = ceil((key_capacity + 1) / 2)` for a node holding at
/// most `key_capacity` keys.
pub(crate) fn min_degree(key_capacity: usize) -> usize {
    key_capacity / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BTreeConfig::default();
        assert_eq!(config.key_capacity, 3);
        assert_eq!(config.min_degree(), 2);
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(BTreeConfig::new(2).is_ok());
        assert!(BTreeConfig::new(1000).is_ok());
        assert!(matches!(
            BTreeConfig::new(1),
            Err(BTreeError::CapacityOutOfRange { requested: 1, .. })
        ));
        assert!(matches!(
            BTreeConfig::new(1001),
            Err(BTreeError::CapacityOutOfRange { requested: 1001, .. })
        ));
    }

    #[test]
    fn test_min_degree() {
        assert_eq!(min_degree(2), 2);
        assert_eq!(min_degree(3), 2);
        assert_eq!(min_degree(4), 3);
        assert_eq!(min_degree(5), 3);
        assert_eq!(min_degree(1000), 501);
    }

    #[test]
    fn test_rebalance_follows_parity() {
        assert_eq!(Rebalance::for_capacity(2), Rebalance::BottomUp);
        assert_eq!(Rebalance::for_capacity(3), Rebalance::TopDown);
        assert_eq!(Rebalance::for_capacity(4), Rebalance::BottomUp);
        assert_eq!(Rebalance::for_capacity(999), Rebalance::TopDown);
        assert_eq!(BTreeConfig::default().rebalance(), Rebalance::TopDown);
    }

    #[test]
    fn test_config_serde() {
        let config: BTreeConfig = serde_json::from_str(r#"{"keyCapacity":7}"#).unwrap();
        assert_eq!(config.key_capacity, 7);
        assert!(config.validate().is_ok());

        let bad: BTreeConfig = serde_json::from_str(r#"{"keyCapacity":0}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}
