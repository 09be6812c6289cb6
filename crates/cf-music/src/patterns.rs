//! Theme patterns — 32 eighth-note steps per channel, `_` is a rest

use cf_stage::taxonomy::MusicMode;

use crate::notes::Note;

/// Steps per pattern loop
pub const PATTERN_STEPS: usize = 32;

/// One channel's loop
pub type Track = [Option<Note>; PATTERN_STEPS];

macro_rules! track {
    (@step _) => { None };
    (@step $note:ident) => { Some(Note::$note) };
    ($($step:tt)*) => { [$(track!(@step $step)),*] };
}

/// The three channels of a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub melody: Track,
    pub bass: Track,
    pub arp: Track,
}

impl Theme {
    /// Theme played in a music mode
    pub fn for_mode(mode: MusicMode) -> &'static Theme {
        match mode {
            MusicMode::Idle => &IDLE_THEME,
            MusicMode::Spin => &SPIN_THEME,
        }
    }
}

/// Relaxed town loop
pub static IDLE_THEME: Theme = Theme {
    melody: track!(
        E4 G4 A4 G4 E4 D4 C4 _
        D4 E4 G4 E4 D4 C4 D4 _
        E4 G4 A4 C5 A4 G4 E4 G4
        A4 G4 E4 D4 C4 D4 E4 _
    ),
    bass: track!(
        C3 _ G3 _ A3 _ G3 _
        F3 _ C3 _ G3 _ C3 _
        C3 _ E3 _ A3 _ G3 _
        F3 _ G3 _ C3 _ C3 _
    ),
    arp: track!(
        C5 E5 G5 _ A4 C5 E5 _
        D5 G5 A5 _ E5 G5 C5 _
        C5 E5 G5 _ A4 C5 E5 _
        G5 E5 C5 _ D5 E5 G5 _
    ),
};

/// Driving loop while the strip scrolls
pub static SPIN_THEME: Theme = Theme {
    melody: track!(
        E5 E5 D5 E5 G5 A5 G5 E5
        D5 C5 D5 E5 G5 E5 D5 C5
        A4 C5 D5 E5 G5 A5 G5 E5
        D5 E5 G5 A5 G5 E5 D5 C5
    ),
    bass: track!(
        C3 C3 G3 G3 A3 A3 G3 G3
        F3 F3 C3 C3 G3 G3 E3 E3
        A3 A3 C3 C3 G3 G3 E3 E3
        F3 F3 G3 G3 C3 C3 C3 C3
    ),
    arp: track!(
        C5 G5 E5 G5 C5 E5 G5 A5
        D5 A5 G5 E5 D5 G5 E5 C5
        A4 E5 C5 E5 G5 A5 G5 E5
        D5 G5 E5 G5 A5 G5 E5 C5
    ),
};
