//! Spin Session — the Idle → Spinning → Revealed state machine
//!
//! The outcome is drawn and the strip built when the spin is accepted; the
//! animation clock starts on the first frame after that, so the scroll
//! begins when the host actually paints.

use cf_core::{CfError, CfResult, PrizeItem, PrizePool, RandomSource};
use cf_roulette::{
    AnimationClock, ClockEvent, Selection, SpinTiming, Strip, StripConfig, Tier, TierTable,
    build_strip, select_in_tier, select_winner,
};
use cf_stage::{MachineEvent, SpinState};

use crate::config::MachineConfig;

/// Outcome forced onto a spin (demos, QA)
#[derive(Debug, Clone, PartialEq)]
pub enum ForcedOutcome {
    /// Uniform pick from one tier, skipping the tier roll
    Tier(usize),
    /// A specific pool item by id
    Item(String),
}

/// One machine's spin lifecycle
pub struct SpinSession {
    pool: PrizePool,
    table: TierTable,
    tiers: Vec<Tier>,
    strip_config: StripConfig,
    timing: SpinTiming,
    clock: AnimationClock,
    rng: Box<dyn RandomSource>,

    state: SpinState,
    spin_count: u64,
    strip: Option<Strip>,
    selection: Option<Selection>,
    clock_pending: bool,
    settled_at_ms: Option<f64>,
    reveal_sent: bool,
}

impl SpinSession {
    pub fn new(
        pool: PrizePool,
        config: &MachineConfig,
        rng: Box<dyn RandomSource>,
    ) -> CfResult<Self> {
        config.validate()?;
        let tiers = config.tiers.partition(pool.items());

        for tier in &tiers {
            log::debug!(
                "Tier {} ({}): {} items @ {:.0}%",
                tier.label,
                tier.tag,
                tier.len(),
                tier.probability * 100.0
            );
        }

        Ok(Self {
            pool,
            table: config.tiers.clone(),
            tiers,
            strip_config: config.strip,
            timing: config.timing,
            clock: AnimationClock::new(config.geometry, config.timing),
            rng,
            state: SpinState::Idle,
            spin_count: 0,
            strip: None,
            selection: None,
            clock_pending: false,
            settled_at_ms: None,
            reveal_sent: false,
        })
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn pool(&self) -> &PrizePool {
        &self.pool
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Spins accepted so far
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// Strip of the current or last spin
    pub fn strip(&self) -> Option<&Strip> {
        self.strip.as_ref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Winner of the spin in flight or on display
    pub fn winner(&self) -> Option<&PrizeItem> {
        self.selection.as_ref().map(|s| &s.winner)
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Current scroll offset (px)
    pub fn offset(&self) -> f64 {
        self.clock.offset()
    }

    /// Build a fresh pre-spin preview strip
    pub fn idle_preview(&mut self) -> CfResult<Strip> {
        Strip::idle_preview(
            self.pool.items(),
            self.strip_config.preview_length,
            self.rng.as_mut(),
        )
    }

    /// Offset that centers the middle slot of the idle preview (px)
    pub fn idle_offset(&self) -> f64 {
        self.clock
            .geometry()
            .idle_offset(self.strip_config.preview_length)
    }

    /// Accept a spin: draw the winner and build the strip.
    ///
    /// `Ok(None)` when a spin is already in flight (request ignored).
    pub fn begin(&mut self, forced: Option<&ForcedOutcome>) -> CfResult<Option<MachineEvent>> {
        if self.state == SpinState::Spinning {
            log::debug!("Spin request ignored: spin #{} in flight", self.spin_count);
            return Ok(None);
        }
        if self.pool.is_empty() {
            return Err(CfError::EmptyPool);
        }

        let selection = match forced {
            None => select_winner(&self.tiers, self.rng.as_mut())?,
            Some(ForcedOutcome::Tier(index)) => {
                select_in_tier(&self.tiers, *index, self.rng.as_mut())?
            }
            Some(ForcedOutcome::Item(id)) => {
                let winner = self
                    .pool
                    .items()
                    .iter()
                    .find(|item| &item.id == id)
                    .cloned()
                    .ok_or_else(|| {
                        CfError::InvalidConfig(format!("no prize with id '{id}' in pool"))
                    })?;
                Selection {
                    tier_index: self.table.tier_index_for(winner.weight_value()),
                    winner,
                    roll: f64::NAN,
                }
            }
        };

        let strip = build_strip(
            self.pool.items(),
            &selection.winner,
            &self.strip_config,
            self.rng.as_mut(),
        )?;

        self.spin_count += 1;
        log::info!(
            "Spin #{}: {} (value {:.2}, tier {})",
            self.spin_count,
            selection.winner.label(),
            selection.winner.value,
            self.tiers[selection.tier_index].tag
        );

        let event = MachineEvent::SpinStarted {
            spin: self.spin_count,
            strip_len: strip.len(),
        };
        self.strip = Some(strip);
        self.selection = Some(selection);
        self.state = SpinState::Spinning;
        self.clock_pending = true;
        self.settled_at_ms = None;
        self.reveal_sent = false;

        Ok(Some(event))
    }

    /// Advance to host time `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> Vec<MachineEvent> {
        let mut events = Vec::new();

        if self.clock_pending {
            self.clock_pending = false;
            if let Err(e) = self.clock.start(now_ms, &self.strip_config) {
                log::error!("Spin #{} could not start: {}", self.spin_count, e);
                self.state = SpinState::Idle;
                self.selection = None;
                return events;
            }
        }

        for clock_event in self.clock.tick(now_ms) {
            match clock_event {
                ClockEvent::CenterCrossed(index) => {
                    events.push(MachineEvent::CenterCrossed { index });
                }
                ClockEvent::Settled(index) => {
                    self.state = SpinState::Revealed;
                    self.settled_at_ms = Some(now_ms);
                    if let Some(selection) = &self.selection {
                        events.push(MachineEvent::Settled {
                            winner: selection.winner.clone(),
                            index,
                        });
                    }
                }
            }
        }

        if self.state == SpinState::Revealed && !self.reveal_sent {
            if let (Some(settled_at), Some(selection)) = (self.settled_at_ms, &self.selection) {
                if now_ms - settled_at >= self.timing.reveal_delay_ms {
                    self.reveal_sent = true;
                    events.push(MachineEvent::RevealReady {
                        winner: selection.winner.clone(),
                    });
                }
            }
        }

        events
    }

    /// Abort a spin in flight. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.state != SpinState::Spinning {
            return false;
        }
        self.clock.cancel();
        self.clock_pending = false;
        self.state = SpinState::Idle;
        self.selection = None;
        log::info!("Spin #{} cancelled", self.spin_count);
        true
    }

    /// Close the reveal. Returns true if one was showing.
    pub fn dismiss(&mut self) -> bool {
        if self.state != SpinState::Revealed {
            return false;
        }
        self.state = SpinState::Idle;
        self.selection = None;
        self.settled_at_ms = None;
        true
    }
}
