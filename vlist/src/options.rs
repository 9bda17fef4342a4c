use alloc::sync::Arc;

use crate::Windower;

/// A callback fired after the windower state changed.
///
/// Batched updates (see [`Windower::batch_update`]) fire it once.
pub type OnChangeCallback = Arc<dyn Fn(&Windower) + Send + Sync>;

/// Configuration for [`crate::compute_window`] and [`crate::Windower`].
///
/// All items share the same `item_height`. The type is `Copy` so adapters can tweak a field and
/// hand it back through `Windower::set_options` without ceremony.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowOptions {
    pub count: usize,
    /// Height of every row in pixels. Must be > 0; zero yields an empty window.
    pub item_height: u32,
    /// Extra pixels rendered above and below the viewport to mask flicker on fast scrolls.
    pub threshold: u32,
}

impl WindowOptions {
    /// Creates options for `count` rows of `item_height` pixels with no overscan.
    pub fn new(count: usize, item_height: u32) -> Self {
        Self {
            count,
            item_height,
            threshold: 0,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Height of the full-list spacer (`count * item_height`).
    pub fn total_size(&self) -> u64 {
        (self.count as u64).saturating_mul(self.item_height as u64)
    }

    /// Pixel top of row `index`. Does not check `index < count`.
    pub fn item_top(&self, index: usize) -> u64 {
        (index as u64).saturating_mul(self.item_height as u64)
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::new(0, 1)
    }
}
