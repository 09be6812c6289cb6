//! Easing curves for the scroll deceleration

use serde::{Deserialize, Serialize};

/// Easing curve mapping progress (0..1) to eased progress (0..1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingCurve {
    /// Constant speed
    Linear,
    /// y = 1 - (1 - t)^3
    EaseOutCubic,
    /// y = 1 - (1 - t)^4 (fast start, long slow tail)
    #[default]
    EaseOutQuart,
}

impl EasingCurve {
    pub fn name(&self) -> &'static str {
        match self {
            EasingCurve::Linear => "Linear",
            EasingCurve::EaseOutCubic => "EaseOutCubic",
            EasingCurve::EaseOutQuart => "EaseOutQuart",
        }
    }

    /// Evaluate at progress t, clamped to [0, 1].
    ///
    /// Monotonic non-decreasing, `evaluate(0) == 0`, `evaluate(1) == 1`.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => t,
            EasingCurve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingCurve::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}
