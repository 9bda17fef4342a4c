//! A headless windowing engine for uniform-height virtualized lists.
//!
//! For viewport tracking and render-loop glue, see the `vlist-adapter` crate.
//!
//! Given a scroll offset, a viewport height, a uniform row height and an overscan threshold, the
//! engine computes which contiguous slice of a large list intersects the viewport and where to
//! place the rendered block inside a full-height spacer.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport height
//! - scroll offset
//! - the items themselves, sliced with [`VisibleWindow::rendered_range`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod options;
mod state;
mod types;
mod window;
mod windower;


pub use options::{OnChangeCallback, WindowOptions};
pub use state::ViewportState;
pub use types::{Align, ItemKey, Rect, VirtualRow, VisibleWindow, key_for_index};
pub use window::compute_window;
pub use windower::Windower;
