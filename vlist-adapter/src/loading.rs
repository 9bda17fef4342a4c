/// Delay used by the demo rows before they flip to loaded.
pub const DEFAULT_LOADING_DELAY_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadState {
    Loading,
    Loaded,
}

/// A timed two-state machine scoped to one rendered row: `Loading` until `delay_ms` passed,
/// then `Loaded`.
///
/// Like other adapter helpers it is driven by `tick(now_ms)`. Cancel it when the row leaves
/// the window; a cancelled flip never transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadingFlip {
    state: LoadState,
    due_ms: u64,
    cancelled: bool,
}

impl LoadingFlip {
    pub fn new(now_ms: u64, delay_ms: u64) -> Self {
        Self {
            state: LoadState::Loading,
            due_ms: now_ms.saturating_add(delay_ms),
            cancelled: false,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns `true` exactly once, on the tick that performs the transition.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.cancelled || self.state == LoadState::Loaded || now_ms < self.due_ms {
            return false;
        }
        self.state = LoadState::Loaded;
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}
