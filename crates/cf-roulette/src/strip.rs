//! Strip Builder — the display sequence scrolled during a spin
//!
//! Filler is cosmetic: every non-winning slot is an independent uniform draw
//! from the whole pool and carries no selection weight.

use cf_core::{CfError, CfResult, PrizeItem, RandomSource};

use crate::timing::StripConfig;

/// Ordered slots shown in the roulette window
#[derive(Debug, Clone, PartialEq)]
pub struct Strip {
    slots: Vec<PrizeItem>,
    winning_index: Option<usize>,
}

impl Strip {
    /// Slots in display order
    pub fn slots(&self) -> &[PrizeItem] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PrizeItem> {
        self.slots.get(index)
    }

    /// Winning slot (None for an idle preview)
    pub fn winning_index(&self) -> Option<usize> {
        self.winning_index
    }

    /// Item in the winning slot
    pub fn winner(&self) -> Option<&PrizeItem> {
        self.winning_index.and_then(|i| self.slots.get(i))
    }

    /// Pre-spin preview: uniform draws, no winner
    pub fn idle_preview<R: RandomSource + ?Sized>(
        pool: &[PrizeItem],
        length: usize,
        rng: &mut R,
    ) -> CfResult<Self> {
        if pool.is_empty() {
            return Err(CfError::EmptyPool);
        }
        let slots = (0..length)
            .map(|_| pool[rng.next_index(pool.len())].clone())
            .collect();
        Ok(Self {
            slots,
            winning_index: None,
        })
    }
}

/// Build a fresh spin strip with `winner` at the configured winning slot
pub fn build_strip<R: RandomSource + ?Sized>(
    pool: &[PrizeItem],
    winner: &PrizeItem,
    config: &StripConfig,
    rng: &mut R,
) -> CfResult<Strip> {
    if pool.is_empty() {
        return Err(CfError::EmptyPool);
    }
    config.validate()?;

    let slots = (0..config.length)
        .map(|i| {
            if i == config.winning_index {
                winner.clone()
            } else {
                pool[rng.next_index(pool.len())].clone()
            }
        })
        .collect();

    Ok(Strip {
        slots,
        winning_index: Some(config.winning_index),
    })
}
