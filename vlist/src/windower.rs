use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::ops::Range;

use crate::window::compute_window;
use crate::{
    Align, OnChangeCallback, ViewportState, VirtualRow, VisibleWindow, WindowOptions,
    key_for_index,
};

/// Stateful windowing for a uniform-height list.
///
/// This type is UI-agnostic:
/// - It does not hold any UI objects or items, only their count.
/// - Your adapter drives it with scroll offsets and viewport heights.
/// - The visible window is derived on demand from the current state; nothing is cached.
///
/// Every setter that actually changes state fires the optional `on_change` callback. Use
/// [`Windower::batch_update`] to coalesce several updates into a single notification.
#[derive(Clone)]
pub struct Windower {
    options: WindowOptions,
    viewport: ViewportState,
    on_change: Option<OnChangeCallback>,

    generation: Cell<u64>,
    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl Windower {
    pub fn new(options: WindowOptions) -> Self {
        vdebug!(
            count = options.count,
            item_height = options.item_height,
            threshold = options.threshold,
            "Windower::new"
        );
        if options.item_height == 0 {
            vwarn!("Windower::new: item_height is zero");
        }
        Self {
            options,
            viewport: ViewportState::default(),
            on_change: None,
            generation: Cell::new(0),
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        if self.options == options {
            return;
        }
        vtrace!(
            count = options.count,
            item_height = options.item_height,
            threshold = options.threshold,
            "Windower::set_options"
        );
        self.options = options;
        self.notify();
    }

    /// Copies the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut WindowOptions)) {
        let mut next = self.options;
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&Windower) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    /// Number of coalesced state changes so far.
    ///
    /// Adapters that cannot register an `on_change` callback (e.g. because their listener is not
    /// `Send`) can compare this before and after an update instead.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn notify_now(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        if let Some(cb) = &self.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// A resize that also moves the scroll position should be applied in one batch, otherwise
    /// the callback sees an intermediate state.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        self.options.count = count;
        self.notify();
    }

    pub fn item_height(&self) -> u32 {
        self.options.item_height
    }

    pub fn set_item_height(&mut self, item_height: u32) {
        if self.options.item_height == item_height {
            return;
        }
        if item_height == 0 {
            vwarn!("Windower::set_item_height: item_height is zero");
        }
        self.options.item_height = item_height;
        self.notify();
    }

    pub fn threshold(&self) -> u32 {
        self.options.threshold
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        if self.options.threshold == threshold {
            return;
        }
        self.options.threshold = threshold;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.viewport.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.viewport.scroll_offset == offset {
            return;
        }
        vtrace!(offset, "Windower::set_scroll_offset");
        self.viewport.scroll_offset = offset;
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        if self.viewport.viewport_height == height {
            return;
        }
        vtrace!(height, "Windower::set_viewport_height");
        self.viewport.viewport_height = height;
        self.notify();
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_height: u32, scroll_offset: u64) {
        self.batch_update(|w| {
            w.set_viewport_height(viewport_height);
            w.set_scroll_offset(scroll_offset);
        });
    }

    /// Returns a snapshot of the current viewport.
    pub fn viewport_state(&self) -> ViewportState {
        self.viewport
    }

    /// Restores the viewport from a previously captured snapshot (single notification).
    pub fn restore_viewport_state(&mut self, viewport: ViewportState) {
        self.set_viewport_and_scroll(viewport.viewport_height, viewport.scroll_offset);
    }

    /// The window for the current viewport.
    pub fn window(&self) -> VisibleWindow {
        compute_window(self.viewport, &self.options)
    }

    /// The window for an arbitrary viewport, using the current options.
    pub fn window_for(&self, viewport: ViewportState) -> VisibleWindow {
        compute_window(viewport, &self.options)
    }

    /// Index range to slice out of the backing items, clipped to `count`.
    pub fn rendered_range(&self) -> Range<usize> {
        self.window().rendered_range(self.options.count)
    }

    /// Height of the full-list spacer.
    pub fn total_size(&self) -> u64 {
        self.options.total_size()
    }

    pub fn item_top(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.options.item_top(index))
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.count;
        let item_height = self.options.item_height as u64;
        if count == 0 || item_height == 0 {
            return None;
        }
        let index = usize::try_from(offset / item_height).unwrap_or(usize::MAX);
        Some(index.min(count - 1))
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size()
            .saturating_sub(self.viewport.viewport_height as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Computes the (clamped) scroll offset that brings `index` into view.
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.options.count == 0 {
            return 0;
        }
        let index = index.min(self.options.count - 1);
        let start = self.options.item_top(index);
        let end = start.saturating_add(self.options.item_height as u64);
        let view = self.viewport.viewport_height as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => {
                let center = start.saturating_add(self.options.item_height as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.viewport.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    /// Scrolls so that `index` is in view. Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    /// Calls `f` for every rendered row, in ascending index order.
    pub fn for_each_row(&self, mut f: impl FnMut(VirtualRow)) {
        for index in self.rendered_range() {
            f(VirtualRow {
                index,
                key: key_for_index(index),
                top: self.options.item_top(index),
            });
        }
    }

    /// Collects rendered rows into `out` (clears `out` first).
    pub fn collect_rows(&self, out: &mut Vec<VirtualRow>) {
        out.clear();
        self.for_each_row(|row| out.push(row));
    }
}

impl core::fmt::Debug for Windower {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Windower")
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("generation", &self.generation.get())
            .finish_non_exhaustive()
    }
}
