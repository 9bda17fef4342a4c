//! Adapter utilities for the `vlist` crate.
//!
//! The `vlist` crate is UI-agnostic and focuses on the windowing math. This crate provides the
//! glue a host needs to drive it:
//!
//! - Viewport tracking with native resize observation and a polling fallback
//! - A scroll/render loop ([`VirtualList`]) that turns items into keyed, positioned frames
//! - A tick-driven interval timer for hosts without their own timers
//! - A timed loading flip for per-row placeholder states
//!
//! Everything is single-threaded (`Rc`/`RefCell`) and framework-agnostic; hosts implement
//! [`ScrollSurface`] and, when needed, [`IntervalTimer`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod list;
mod loading;
mod scheduler;
mod surface;
mod tracker;

#[cfg(test)]
mod tests;

pub use list::{CONTAINER_STYLE, ContainerProps, ListFrame, ListRow, VirtualList};
pub use loading::{DEFAULT_LOADING_DELAY_MS, LoadState, LoadingFlip};
pub use scheduler::TickScheduler;
pub use surface::{IntervalTimer, Notify, OnCancel, ScrollSurface, Subscription};
pub use tracker::{POLL_INTERVAL_MS, ResizeMechanism, SizeFilter, ViewportWatch, watch_viewport};
