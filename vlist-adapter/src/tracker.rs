use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use vlist::Rect;

use crate::{IntervalTimer, Notify, ScrollSurface, Subscription};

/// Polling period used when the surface cannot observe resizes natively.
pub const POLL_INTERVAL_MS: u64 = 300;

/// How a [`ViewportWatch`] learns about size changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResizeMechanism {
    /// The surface pushes notifications (e.g. a DOM `ResizeObserver`).
    Native,
    /// The surface is re-measured every [`POLL_INTERVAL_MS`].
    Polling,
}

/// Dimension-based change detection.
///
/// The first rect always counts as a change, so a freshly created filter reports the initial
/// size even when it is `0x0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeFilter {
    prev: Option<Rect>,
}

impl SizeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `rect` and returns `true` when its height or width differs from the last one.
    pub fn changed(&mut self, rect: Rect) -> bool {
        if self.prev == Some(rect) {
            return false;
        }
        self.prev = Some(rect);
        true
    }

    pub fn last(&self) -> Option<Rect> {
        self.prev
    }
}

struct WatchState {
    filter: SizeFilter,
    callback: Box<dyn FnMut(Rect)>,
}

/// Handle returned by [`watch_viewport`].
///
/// Stopping (explicitly or by dropping the handle) cancels the observation or timer and
/// guarantees the callback is never invoked again, even if the host delivers a late
/// notification.
pub struct ViewportWatch {
    mechanism: ResizeMechanism,
    subscription: Option<Box<dyn Subscription>>,
    active: Rc<Cell<bool>>,
}

impl ViewportWatch {
    pub fn mechanism(&self) -> ResizeMechanism {
        self.mechanism
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Stops all future notifications. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.active.set(false);
        if let Some(mut subscription) = self.subscription.take() {
            vdebug!(mechanism = ?self.mechanism, "ViewportWatch::stop");
            subscription.cancel();
        }
    }
}

impl Drop for ViewportWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for ViewportWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewportWatch")
            .field("mechanism", &self.mechanism)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

/// Reports the content-box size of `surface` to `callback`.
///
/// The callback runs once immediately with the current size, then again each time the height
/// or width actually changes. Native resize observation is preferred; without it the surface
/// is polled through `timer` every [`POLL_INTERVAL_MS`].
pub fn watch_viewport(
    surface: Rc<dyn ScrollSurface>,
    timer: &dyn IntervalTimer,
    callback: impl FnMut(Rect) + 'static,
) -> ViewportWatch {
    let active = Rc::new(Cell::new(true));
    let state = Rc::new(RefCell::new(WatchState {
        filter: SizeFilter::new(),
        callback: Box::new(callback),
    }));

    let check: Notify = {
        let surface = Rc::clone(&surface);
        let active = Rc::clone(&active);
        Rc::new(move || {
            if !active.get() {
                return;
            }
            let rect = surface.content_rect();
            let Ok(mut state) = state.try_borrow_mut() else {
                vwarn!("watch_viewport: reentrant size notification ignored");
                return;
            };
            if state.filter.changed(rect) {
                vtrace!(height = rect.main, width = rect.cross, "viewport size changed");
                (state.callback)(rect);
            }
        })
    };

    check();

    let (mechanism, subscription) = match surface.observe_resize(Rc::clone(&check)) {
        Some(subscription) => (ResizeMechanism::Native, subscription),
        None => {
            vdebug!(
                period_ms = POLL_INTERVAL_MS,
                "native resize observation unavailable, polling"
            );
            (
                ResizeMechanism::Polling,
                timer.set_interval(POLL_INTERVAL_MS, check),
            )
        }
    };

    ViewportWatch {
        mechanism,
        subscription: Some(subscription),
        active,
    }
}
