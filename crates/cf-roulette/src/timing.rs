//! Strip layout, viewport geometry and spin timing profiles

use serde::{Deserialize, Serialize};

use cf_core::{CfError, CfResult};

use crate::curve::EasingCurve;

/// Shape of the strip built for each spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripConfig {
    /// Number of slots
    pub length: usize,
    /// Slot holding the winner
    pub winning_index: usize,
    /// Number of slots in the idle preview strip
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

fn default_preview_length() -> usize {
    15
}

impl StripConfig {
    pub fn new(length: usize, winning_index: usize) -> Self {
        Self {
            length,
            winning_index,
            preview_length: default_preview_length(),
        }
    }

    pub fn validate(&self) -> CfResult<()> {
        if self.length == 0 {
            return Err(CfError::InvalidConfig("strip length must be > 0".into()));
        }
        if self.winning_index >= self.length {
            return Err(CfError::InvalidConfig(format!(
                "winning index {} outside strip of length {}",
                self.winning_index, self.length
            )));
        }
        Ok(())
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self::new(60, 48)
    }
}

/// Horizontal layout of the strip inside the viewport (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Width of one card slot
    pub card_width: f64,
    /// Gap between slots
    pub gap: f64,
    /// Visible width of the roulette window
    pub viewport_width: f64,
}

impl Geometry {
    pub fn new(card_width: f64, gap: f64, viewport_width: f64) -> Self {
        Self {
            card_width,
            gap,
            viewport_width,
        }
    }

    /// Distance between consecutive slot origins
    #[inline]
    pub fn step(&self) -> f64 {
        self.card_width + self.gap
    }

    /// Offset that places slot 0 in the middle of the viewport
    #[inline]
    pub fn center_offset(&self) -> f64 {
        self.viewport_width / 2.0 - self.card_width / 2.0
    }

    /// Scroll offset at which `index` sits centered in the viewport
    #[inline]
    pub fn offset_for_index(&self, index: usize) -> f64 {
        index as f64 * self.step() - self.center_offset()
    }

    /// Slot nearest the viewport center at a scroll offset
    #[inline]
    pub fn center_index(&self, offset: f64) -> usize {
        let idx = ((offset + self.center_offset()) / self.step()).round();
        if idx <= 0.0 { 0 } else { idx as usize }
    }

    /// Offset that centers the middle slot of an idle preview strip
    pub fn idle_offset(&self, preview_length: usize) -> f64 {
        self.offset_for_index(preview_length / 2)
    }

    /// Check the layout can scroll forward to the winning slot
    pub fn validate_for(&self, strip: &StripConfig) -> CfResult<()> {
        if !(self.card_width > 0.0) || !(self.viewport_width > 0.0) || !(self.gap >= 0.0) {
            return Err(CfError::InvalidConfig(format!(
                "geometry must have positive widths and non-negative gap: {self:?}"
            )));
        }
        let target = self.offset_for_index(strip.winning_index);
        if target < 0.0 {
            return Err(CfError::InvalidConfig(format!(
                "viewport {}px too wide to scroll to slot {}",
                self.viewport_width, strip.winning_index
            )));
        }
        Ok(())
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(200.0, 12.0, 600.0)
    }
}

/// Timing profile for spins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Short spins for audio checks
    Studio,
}

/// Spin animation timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTiming {
    pub profile: TimingProfile,

    /// Total scroll duration (ms)
    pub spin_duration_ms: f64,

    /// Delay between settling and opening the reveal panel (ms)
    pub reveal_delay_ms: f64,

    /// Deceleration curve
    #[serde(default)]
    pub easing: EasingCurve,
}

impl SpinTiming {
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_duration_ms: 5000.0,
            reveal_delay_ms: 350.0,
            easing: EasingCurve::EaseOutQuart,
        }
    }

    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_duration_ms: 2500.0,
            reveal_delay_ms: 200.0,
            easing: EasingCurve::EaseOutQuart,
        }
    }

    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            spin_duration_ms: 1000.0,
            reveal_delay_ms: 0.0,
            easing: EasingCurve::EaseOutQuart,
        }
    }

    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
        }
    }

    pub fn validate(&self) -> CfResult<()> {
        if !(self.spin_duration_ms > 0.0) {
            return Err(CfError::InvalidConfig(format!(
                "spin duration must be > 0, got {}",
                self.spin_duration_ms
            )));
        }
        if !(self.reveal_delay_ms >= 0.0) {
            return Err(CfError::InvalidConfig("reveal delay must be >= 0".into()));
        }
        Ok(())
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}
