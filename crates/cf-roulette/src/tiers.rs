//! Drop-rate tiers — value bands and their probabilities

use serde::{Deserialize, Serialize};

use cf_core::{CfError, CfResult, PrizeItem};

/// Tolerance for the probability sum check
const PROBABILITY_EPSILON: f64 = 1e-6;

/// One value band of the drop table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Display label (e.g., "$1 – $10")
    pub label: String,

    /// Rarity tag (e.g., "Uncommon")
    #[serde(default)]
    pub tag: String,

    /// Exclusive upper bound of the value band. `None` = unbounded.
    #[serde(default)]
    pub max_value: Option<f64>,

    /// Chance of this tier being rolled (0, 1]
    pub probability: f64,
}

impl TierDefinition {
    pub fn new(
        label: impl Into<String>,
        tag: impl Into<String>,
        max_value: Option<f64>,
        probability: f64,
    ) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
            max_value,
            probability,
        }
    }

    /// Does a value fall inside this band (given lower bands already failed)?
    #[inline]
    pub fn accepts(&self, value: f64) -> bool {
        match self.max_value {
            Some(max) => value < max,
            None => true,
        }
    }
}

/// Ordered drop table, lowest band first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub tiers: Vec<TierDefinition>,
}

impl TierTable {
    /// The standard four-tier card table
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                TierDefinition::new("$0 – $1", "Common", Some(1.0), 0.45),
                TierDefinition::new("$1 – $10", "Uncommon", Some(10.0), 0.30),
                TierDefinition::new("$10 – $50", "Rare", Some(50.0), 0.18),
                TierDefinition::new("$50 +", "Ultra Rare", None, 0.07),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Check that the table is a proper partition with a full probability mass
    pub fn validate(&self) -> CfResult<()> {
        let last = self
            .tiers
            .len()
            .checked_sub(1)
            .ok_or_else(|| CfError::InvalidConfig("tier table has no tiers".into()))?;

        let mut prev_max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for (i, tier) in self.tiers.iter().enumerate() {
            if !(tier.probability > 0.0 && tier.probability <= 1.0) {
                return Err(CfError::InvalidConfig(format!(
                    "tier '{}' probability {} outside (0, 1]",
                    tier.label, tier.probability
                )));
            }
            sum += tier.probability;

            match (tier.max_value, i == last) {
                (None, false) => {
                    return Err(CfError::InvalidConfig(format!(
                        "tier '{}' is unbounded but not the last tier",
                        tier.label
                    )));
                }
                (Some(_), true) => {
                    return Err(CfError::InvalidConfig(format!(
                        "last tier '{}' must be unbounded",
                        tier.label
                    )));
                }
                (Some(max), false) => {
                    if !(max > prev_max) {
                        return Err(CfError::InvalidConfig(format!(
                            "tier '{}' bound {} not above previous bound",
                            tier.label, max
                        )));
                    }
                    prev_max = max;
                }
                (None, true) => {}
            }
        }

        if (sum - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(CfError::InvalidConfig(format!(
                "tier probabilities sum to {sum}, expected 1.0"
            )));
        }
        Ok(())
    }

    /// Index of the first tier whose band accepts the value
    pub fn tier_index_for(&self, value: f64) -> usize {
        self.tiers
            .iter()
            .position(|t| t.accepts(value))
            .unwrap_or(self.tiers.len().saturating_sub(1))
    }

    /// Bucket a pool into tiers. Pure; an empty pool yields empty tiers.
    pub fn partition(&self, pool: &[PrizeItem]) -> Vec<Tier> {
        let mut tiers: Vec<Tier> = self
            .tiers
            .iter()
            .map(|def| Tier {
                label: def.label.clone(),
                tag: def.tag.clone(),
                probability: def.probability,
                items: Vec::new(),
            })
            .collect();

        if tiers.is_empty() {
            return tiers;
        }

        for item in pool {
            let idx = self.tier_index_for(item.weight_value());
            tiers[idx].items.push(item.clone());
        }

        log::debug!(
            "Partitioned {} prizes into tiers {:?}",
            pool.len(),
            tiers.iter().map(|t| t.items.len()).collect::<Vec<_>>()
        );
        tiers
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A tier with its member prizes
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub label: String,
    pub tag: String,
    pub probability: f64,
    pub items: Vec<PrizeItem>,
}

impl Tier {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Total prizes across tiers
pub fn total_items(tiers: &[Tier]) -> usize {
    tiers.iter().map(Tier::len).sum()
}
