use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{IntervalTimer, Notify, Subscription};

struct Interval {
    id: u64,
    period_ms: u64,
    last_ms: u64,
    notify: Notify,
}

#[derive(Default)]
struct Inner {
    now_ms: u64,
    next_id: u64,
    intervals: Vec<Interval>,
}

impl Inner {
    fn is_registered(&self, id: u64) -> bool {
        self.intervals.iter().any(|iv| iv.id == id)
    }
}

/// An adapter-driven interval timer.
///
/// Hosts without their own timers (terminal loops, tests) call [`TickScheduler::tick`] each
/// frame; every interval whose period elapsed since it last fired runs once for that tick.
///
/// Cloning shares the same schedule.
#[derive(Clone, Default)]
pub struct TickScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the last tick.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    pub fn active_intervals(&self) -> usize {
        self.inner.borrow().intervals.len()
    }

    /// Advances the clock to `now_ms` and fires due intervals. Returns how many fired.
    ///
    /// Time never goes backwards: an older `now_ms` is treated as the current time.
    pub fn tick(&self, now_ms: u64) -> usize {
        let due: Vec<(u64, Notify)> = {
            let mut inner = self.inner.borrow_mut();
            let now_ms = now_ms.max(inner.now_ms);
            inner.now_ms = now_ms;
            let mut due = Vec::new();
            for iv in inner.intervals.iter_mut() {
                if now_ms.saturating_sub(iv.last_ms) >= iv.period_ms {
                    iv.last_ms = now_ms;
                    due.push((iv.id, Rc::clone(&iv.notify)));
                }
            }
            due
        };

        let mut fired = 0;
        for (id, notify) in due {
            // An earlier callback in this tick may have cancelled this one.
            if !self.inner.borrow().is_registered(id) {
                continue;
            }
            notify();
            fired += 1;
        }
        fired
    }
}

impl IntervalTimer for TickScheduler {
    fn set_interval(&self, period_ms: u64, notify: Notify) -> Box<dyn Subscription> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        let last_ms = inner.now_ms;
        inner.intervals.push(Interval {
            id,
            period_ms: period_ms.max(1),
            last_ms,
            notify,
        });
        vtrace!(id, period_ms, "TickScheduler::set_interval");
        Box::new(IntervalHandle {
            id,
            inner: Rc::downgrade(&self.inner),
        })
    }
}

impl core::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TickScheduler")
            .field("now_ms", &inner.now_ms)
            .field("intervals", &inner.intervals.len())
            .finish()
    }
}

struct IntervalHandle {
    id: u64,
    inner: Weak<RefCell<Inner>>,
}

impl Subscription for IntervalHandle {
    fn cancel(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        // Drop the removed callbacks after releasing the borrow: they may own other handles.
        let removed: Vec<Interval> = {
            let mut inner = inner.borrow_mut();
            let (removed, kept) = core::mem::take(&mut inner.intervals)
                .into_iter()
                .partition(|iv| iv.id == self.id);
            inner.intervals = kept;
            removed
        };
        drop(removed);
    }
}
