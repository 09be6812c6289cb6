//! Note table (equal temperament, A4 = 440 Hz)

use serde::{Deserialize, Serialize};

/// Pitches used by the themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C3,
    D3,
    E3,
    F3,
    G3,
    A3,
    B3,
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
    E5,
    G5,
    A5,
}

impl Note {
    /// Frequency in Hz
    pub const fn frequency(self) -> f32 {
        match self {
            Note::C3 => 130.81,
            Note::D3 => 146.83,
            Note::E3 => 164.81,
            Note::F3 => 174.61,
            Note::G3 => 196.00,
            Note::A3 => 220.00,
            Note::B3 => 246.94,
            Note::C4 => 261.63,
            Note::D4 => 293.66,
            Note::E4 => 329.63,
            Note::F4 => 349.23,
            Note::G4 => 392.00,
            Note::A4 => 440.00,
            Note::B4 => 493.88,
            Note::C5 => 523.25,
            Note::D5 => 587.33,
            Note::E5 => 659.25,
            Note::G5 => 783.99,
            Note::A5 => 880.00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octaves_double() {
        for (low, high) in [(Note::C3, Note::C4), (Note::A3, Note::A4), (Note::E4, Note::E5)] {
            let ratio = high.frequency() / low.frequency();
            assert!((ratio - 2.0).abs() < 0.01, "{low:?} -> {high:?}");
        }
        assert_eq!(Note::A4.frequency(), 440.0);
    }
}
