//! Weighted Selector — two-stage draw: tier by probability, then item uniformly
//!
//! The tier roll gives pricier prizes their lower overall drop rate no matter
//! how many items populate each tier.

use cf_core::{CfError, CfResult, PrizeItem, RandomSource};

use crate::tiers::Tier;

/// Outcome of a draw
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The winning prize
    pub winner: PrizeItem,
    /// Tier the winner was drawn from
    pub tier_index: usize,
    /// The uniform roll that chose the tier
    pub roll: f64,
}

/// Resolve a roll in [0, 1) to a tier index.
///
/// Walks tiers in order accumulating probability and takes the first
/// non-empty tier whose cumulative mass reaches the roll. Mass of empty
/// tiers passes through to the next tier. If the walk ends without a hit,
/// the first non-empty tier is used. `None` only when every tier is empty.
pub fn resolve_tier(tiers: &[Tier], roll: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for (i, tier) in tiers.iter().enumerate() {
        cumulative += tier.probability;
        if cumulative >= roll && !tier.is_empty() {
            return Some(i);
        }
    }

    tiers.iter().position(|t| !t.is_empty())
}

/// Draw one winner from partitioned tiers
pub fn select_winner<R: RandomSource + ?Sized>(
    tiers: &[Tier],
    rng: &mut R,
) -> CfResult<Selection> {
    let roll = rng.next_unit();
    let tier_index = resolve_tier(tiers, roll).ok_or(CfError::EmptyPool)?;
    let tier = &tiers[tier_index];
    let item_index = rng.next_index(tier.len());
    let winner = tier.items[item_index].clone();

    log::debug!(
        "Roll {:.4} -> tier {} ({}), item {} of {}: {}",
        roll,
        tier_index,
        tier.label,
        item_index,
        tier.len(),
        winner.id
    );

    Ok(Selection {
        winner,
        tier_index,
        roll,
    })
}

/// Draw uniformly from one tier, bypassing the tier roll (forced outcomes).
///
/// `roll` is reported as NaN since no tier roll happened.
pub fn select_in_tier<R: RandomSource + ?Sized>(
    tiers: &[Tier],
    tier_index: usize,
    rng: &mut R,
) -> CfResult<Selection> {
    let tier = tiers.get(tier_index).ok_or_else(|| {
        CfError::InvalidConfig(format!(
            "tier {} out of range ({} tiers)",
            tier_index,
            tiers.len()
        ))
    })?;
    if tier.is_empty() {
        return Err(CfError::InvalidConfig(format!(
            "tier {} ({}) has no items",
            tier_index, tier.label
        )));
    }
    let winner = tier.items[rng.next_index(tier.len())].clone();
    log::debug!("Forced tier {} ({}): {}", tier_index, tier.label, winner.id);

    Ok(Selection {
        winner,
        tier_index,
        roll: f64::NAN,
    })
}
