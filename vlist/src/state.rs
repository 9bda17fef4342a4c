/// A lightweight, serializable snapshot of the current viewport.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`, which makes it easy
/// to restore the scroll position of a list across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub scroll_offset: u64,
    pub viewport_height: u32,
}

impl ViewportState {
    pub fn new(scroll_offset: u64, viewport_height: u32) -> Self {
        Self {
            scroll_offset,
            viewport_height,
        }
    }
}
