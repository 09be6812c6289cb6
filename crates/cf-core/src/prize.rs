//! Prize items supplied by the pool collaborator

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A single prize the machine can hand out.
///
/// Owned by whoever supplies the pool; the roulette only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeItem {
    /// Stable identifier from the catalogue
    pub id: String,
    /// Display name (reveal panel, share text)
    #[serde(default)]
    pub name: String,
    /// Thumbnail shown in the strip
    pub display_image_ref: String,
    /// Full-resolution image for the reveal panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_image_ref: Option<String>,
    /// Market value, drives tier assignment
    pub value: f64,
}

impl PrizeItem {
    /// Create a prize with no name and no full-size image
    pub fn new(id: impl Into<String>, display_image_ref: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            display_image_ref: display_image_ref.into(),
            full_image_ref: None,
            value,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set full-resolution image reference
    pub fn with_full_image(mut self, image_ref: impl Into<String>) -> Self {
        self.full_image_ref = Some(image_ref.into());
        self
    }

    /// Image to show on the reveal panel
    pub fn reveal_image_ref(&self) -> &str {
        match self.full_image_ref.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => &self.display_image_ref,
        }
    }

    /// Value used for tiering. NaN counts as worthless.
    #[inline]
    pub fn weight_value(&self) -> f64 {
        if self.value.is_nan() { 0.0 } else { self.value }
    }

    /// Name if present, otherwise the id
    pub fn label(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

/// Shared, read-only prize pool.
///
/// Items without a display image are dropped on construction since they
/// cannot be rendered in the strip.
#[derive(Debug, Clone, Default)]
pub struct PrizePool {
    items: Arc<[PrizeItem]>,
}

impl PrizePool {
    /// Build a pool from catalogue items
    pub fn from_items(items: impl IntoIterator<Item = PrizeItem>) -> Self {
        let items: Vec<PrizeItem> = items
            .into_iter()
            .filter(|item| !item.display_image_ref.is_empty())
            .collect();
        Self {
            items: items.into(),
        }
    }

    /// Empty pool
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PrizeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PrizeItem> {
        self.items.get(index)
    }
}
