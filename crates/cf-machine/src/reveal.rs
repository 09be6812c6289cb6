//! Reveal panel — what the host shows once the strip has settled

use serde::{Deserialize, Serialize};

use cf_core::PrizeItem;

/// Winner presentation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealPanel {
    winner: PrizeItem,
    image_loaded: bool,
    open: bool,
}

impl RevealPanel {
    /// Panel for a freshly settled winner: closed, image not yet loaded
    pub fn new(winner: PrizeItem) -> Self {
        Self {
            winner,
            image_loaded: false,
            open: false,
        }
    }

    pub fn winner(&self) -> &PrizeItem {
        &self.winner
    }

    /// Full-size image the panel wants to show
    pub fn image_ref(&self) -> &str {
        self.winner.reveal_image_ref()
    }

    /// Image to draw right now; `None` means draw the placeholder
    pub fn display_image(&self) -> Option<&str> {
        self.image_loaded.then(|| self.image_ref())
    }

    /// Host reports an image finished loading. Returns true if it was ours.
    pub fn mark_loaded(&mut self, image_ref: &str) -> bool {
        let ours = image_ref == self.image_ref();
        if ours {
            self.image_loaded = true;
        }
        ours
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
    }
}

/// Fill the share template for a prize
pub fn share_text(template: &str, winner: &PrizeItem) -> String {
    template.replace("{name}", winner.label())
}
