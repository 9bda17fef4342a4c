use alloc::boxed::Box;
use alloc::rc::Rc;

use vlist::Rect;

/// A parameterless notification handed to the host.
///
/// The host calls it whenever it *might* have a new size to report; the tracker reads the
/// current rect itself and filters out notifications that changed nothing.
pub type Notify = Rc<dyn Fn()>;

/// The scrollable element a list is rendered into.
///
/// Implemented by the host (a DOM binding, a terminal pane, a test double).
pub trait ScrollSurface {
    /// Current scroll offset along the list axis, in pixels.
    fn scroll_offset(&self) -> u64;

    /// Current content-box size (`main` = height, `cross` = width).
    fn content_rect(&self) -> Rect;

    /// Starts native resize observation of this surface.
    ///
    /// Return `None` when the platform cannot observe resizes; the tracker then falls back to
    /// polling through an [`IntervalTimer`].
    fn observe_resize(&self, notify: Notify) -> Option<Box<dyn Subscription>> {
        let _ = notify;
        None
    }
}

/// A fixed-period timer provided by the host.
pub trait IntervalTimer {
    fn set_interval(&self, period_ms: u64, notify: Notify) -> Box<dyn Subscription>;
}

/// A live observation or timer registration.
///
/// `cancel` releases the underlying resource. It may be called more than once.
pub trait Subscription {
    fn cancel(&mut self);
}

/// A [`Subscription`] that runs a closure on the first `cancel` (or on drop).
///
/// Handy for hosts whose teardown is a single call, e.g. disconnecting an observer.
pub struct OnCancel<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> OnCancel<F> {
    pub fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<F: FnOnce()> Subscription for OnCancel<F> {
    fn cancel(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl<F: FnOnce()> Drop for OnCancel<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}
