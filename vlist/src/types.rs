use core::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// Platform-agnostic viewport geometry.
///
/// - `main` is the virtualized axis size (height for a vertical list)
/// - `cross` is the cross axis size (width for a vertical list)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

impl Rect {
    pub fn new(main: u32, cross: u32) -> Self {
        Self { main, cross }
    }
}

/// The contiguous index window to render for a given viewport.
///
/// `end_index` is **inclusive** and may point past the end of the data set; use
/// [`VisibleWindow::rendered_range`] to obtain the slice range for a concrete item count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start_index: usize,
    pub end_index: usize, // inclusive
    /// Pixel offset of the rendered block from the top of the spacer.
    pub top_offset: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    degenerate: bool,
}

impl VisibleWindow {
    pub fn new(start_index: usize, end_index: usize, top_offset: u64) -> Self {
        Self {
            start_index,
            end_index,
            top_offset,
            degenerate: false,
        }
    }

    /// A window that renders nothing, positioned at `top_offset`.
    ///
    /// Produced for configurations with no row geometry (`item_height == 0`). Both indices are
    /// 0 but, unlike `new(0, 0, _)`, row 0 is not part of the window.
    pub fn degenerate(top_offset: u64) -> Self {
        Self {
            start_index: 0,
            end_index: 0,
            top_offset,
            degenerate: true,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Slice range of `items[start_index..=end_index]`, clipped to `count`.
    ///
    /// Windows past the end of the data yield an empty range instead of an error, and so does
    /// a degenerate window.
    pub fn rendered_range(&self, count: usize) -> Range<usize> {
        if self.degenerate {
            return 0..0;
        }
        let end = self.end_index.saturating_add(1).min(count);
        let start = self.start_index.min(end);
        start..end
    }

    pub fn rendered_len(&self, count: usize) -> usize {
        self.rendered_range(count).len()
    }

    pub fn is_empty_for(&self, count: usize) -> bool {
        self.rendered_range(count).is_empty()
    }

    /// Whether `index` falls inside the (unclipped) window.
    pub fn contains(&self, index: usize) -> bool {
        !self.degenerate && index >= self.start_index && index <= self.end_index
    }
}

/// A rendered row: its absolute index, identity key and pixel top within the spacer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRow {
    pub index: usize,
    pub key: ItemKey,
    pub top: u64,
}

/// Row identity. Always the absolute index of the row, so UI diffing stays stable as the
/// window slides.
pub type ItemKey = u64;

pub fn key_for_index(index: usize) -> ItemKey {
    index as ItemKey
}
