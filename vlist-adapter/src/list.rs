use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::ops::Range;

use vlist::{Align, ItemKey, ViewportState, VisibleWindow, WindowOptions, Windower, key_for_index};

use crate::{IntervalTimer, ResizeMechanism, ScrollSurface, ViewportWatch, watch_viewport};

/// Styles the container needs for the spacer/block layout to work.
pub const CONTAINER_STYLE: &str = "overflow: auto; position: relative;";

/// Presentation pass-through for the scroll container. Never read by the windowing logic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerProps {
    pub class: Option<String>,
    pub style: Option<String>,
}

impl ContainerProps {
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// The caller's style followed by [`CONTAINER_STYLE`], which wins on conflicts.
    pub fn merged_style(&self) -> String {
        match self.style.as_deref().map(str::trim) {
            Some(style) if !style.is_empty() => {
                let sep = if style.ends_with(';') { " " } else { "; " };
                format!("{style}{sep}{CONTAINER_STYLE}")
            }
            _ => String::from(CONTAINER_STYLE),
        }
    }
}

/// One rendered item. `key` equals the absolute index so UI diffing stays stable while the
/// window slides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRow<R> {
    pub key: ItemKey,
    pub index: usize,
    pub node: R,
}

/// Everything a host needs to draw one frame of the list:
///
/// - an empty spacer `spacer_height` pixels tall, establishing the scrollable height
/// - an absolutely positioned block at `block_top` holding `rows` in order
///
/// `window` is the raw window and its `end_index` may lie past the data; `rendered` is the
/// index range actually present in `rows`, always within `0..items.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListFrame<R> {
    pub spacer_height: u64,
    pub block_top: u64,
    pub window: VisibleWindow,
    pub rendered: Range<usize>,
    pub rows: Vec<ListRow<R>>,
    pub container: ContainerProps,
}

impl<R> ListFrame<R> {
    pub fn keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.rows.iter().map(|row| row.key)
    }
}

type WindowListener = Box<dyn FnMut(VisibleWindow)>;

struct Shared {
    windower: Windower,
    detached: bool,
    recomputes: u64,
    listener: Option<WindowListener>,
}

/// Applies `f` to the windower and, if that changed anything, notifies the listener.
///
/// The listener runs after the borrow is released, so it may freely read the list.
fn update(shared: &RefCell<Shared>, f: impl FnOnce(&mut Windower)) {
    let (window, listener) = {
        let mut s = shared.borrow_mut();
        if s.detached {
            return;
        }
        let before = s.windower.generation();
        f(&mut s.windower);
        if s.windower.generation() == before {
            return;
        }
        s.recomputes = s.recomputes.saturating_add(1);
        let window = s.windower.window();
        vtrace!(
            start = window.start_index,
            end = window.end_index,
            top = window.top_offset,
            "window recomputed"
        );
        (window, s.listener.take())
    };

    if let Some(mut listener) = listener {
        listener(window);
        let mut s = shared.borrow_mut();
        if s.listener.is_none() {
            s.listener = Some(listener);
        }
    }
}

/// A virtualized list bound to a scroll surface.
///
/// Scroll offsets and viewport sizes flow in (`on_scroll`, the resize watch set up by
/// `attach`); frames flow out of `render`. The list never owns the items: `render` slices the
/// caller's slice and calls the render function once per visible item.
pub struct VirtualList {
    shared: Rc<RefCell<Shared>>,
    surface: Option<Rc<dyn ScrollSurface>>,
    watch: Option<ViewportWatch>,
    container: ContainerProps,
}

impl VirtualList {
    pub fn new(options: WindowOptions) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                windower: Windower::new(options),
                detached: false,
                recomputes: 0,
                listener: None,
            })),
            surface: None,
            watch: None,
            container: ContainerProps::default(),
        }
    }

    pub fn with_container(mut self, container: ContainerProps) -> Self {
        self.container = container;
        self
    }

    pub fn container(&self) -> &ContainerProps {
        &self.container
    }

    /// Binds the list to `surface` and starts tracking its size.
    ///
    /// Any previous binding is stopped first. `timer` is only used when the surface cannot
    /// observe resizes natively.
    pub fn attach(&mut self, surface: Rc<dyn ScrollSurface>, timer: &dyn IntervalTimer) {
        self.stop_watch();
        self.shared.borrow_mut().detached = false;

        let shared: Weak<RefCell<Shared>> = Rc::downgrade(&self.shared);
        let watch = watch_viewport(Rc::clone(&surface), timer, move |rect| {
            if let Some(shared) = shared.upgrade() {
                update(&shared, |w| w.set_viewport_height(rect.main));
            }
        });
        vdebug!(mechanism = ?watch.mechanism(), "VirtualList::attach");

        self.watch = Some(watch);
        self.surface = Some(surface);
        self.on_scroll();
    }

    /// Stops size tracking. Scroll, resize and option updates are ignored until the next
    /// `attach`.
    pub fn detach(&mut self) {
        self.stop_watch();
        self.surface = None;
        self.shared.borrow_mut().detached = true;
        vdebug!("VirtualList::detach");
    }

    fn stop_watch(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.stop();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.watch.as_ref().is_some_and(ViewportWatch::is_active)
    }

    pub fn mechanism(&self) -> Option<ResizeMechanism> {
        self.watch.as_ref().map(ViewportWatch::mechanism)
    }

    /// Reads the surface's scroll offset. Call from the surface's scroll event.
    pub fn on_scroll(&mut self) {
        let Some(surface) = &self.surface else {
            return;
        };
        let offset = surface.scroll_offset();
        update(&self.shared, |w| w.set_scroll_offset(offset));
    }

    /// For hosts whose scroll events already carry the offset.
    pub fn on_scroll_offset(&mut self, offset: u64) {
        update(&self.shared, |w| w.set_scroll_offset(offset));
    }

    /// Applies a viewport height directly, bypassing the resize watch.
    pub fn on_viewport_height(&mut self, height: u32) {
        update(&self.shared, |w| w.set_viewport_height(height));
    }

    /// Registers a listener invoked with the new window after every recomputation.
    pub fn set_on_window_change(&mut self, listener: impl FnMut(VisibleWindow) + 'static) {
        self.shared.borrow_mut().listener = Some(Box::new(listener));
    }

    pub fn clear_on_window_change(&mut self) {
        self.shared.borrow_mut().listener = None;
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        update(&self.shared, |w| w.set_options(options));
    }

    pub fn set_count(&mut self, count: usize) {
        update(&self.shared, |w| w.set_count(count));
    }

    pub fn set_item_height(&mut self, item_height: u32) {
        update(&self.shared, |w| w.set_item_height(item_height));
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        update(&self.shared, |w| w.set_threshold(threshold));
    }

    /// Computes the offset that brings `index` into view and applies it.
    ///
    /// Returns the offset so the host can move its real scroll position to match.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.shared.borrow().windower.scroll_to_index_offset(index, align);
        update(&self.shared, |w| w.set_scroll_offset(offset));
        offset
    }

    pub fn options(&self) -> WindowOptions {
        *self.shared.borrow().windower.options()
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.shared.borrow().windower.viewport_state()
    }

    pub fn window(&self) -> VisibleWindow {
        self.shared.borrow().windower.window()
    }

    /// Number of times a scroll, resize or option change produced a new window.
    pub fn recompute_count(&self) -> u64 {
        self.shared.borrow().recomputes
    }

    /// Renders the current window of `items`.
    ///
    /// `items.len()` becomes the list's count, so the window is always sliced against the real
    /// data. `render_item` runs once per visible item, in index order.
    pub fn render<T, R>(
        &mut self,
        items: &[T],
        mut render_item: impl FnMut(&T) -> R,
    ) -> ListFrame<R> {
        self.set_count(items.len());

        let (options, window) = {
            let s = self.shared.borrow();
            (*s.windower.options(), s.windower.window())
        };
        let range = window.rendered_range(items.len());
        let rows = items[range.clone()]
            .iter()
            .zip(range.clone())
            .map(|(item, index)| ListRow {
                key: key_for_index(index),
                index,
                node: render_item(item),
            })
            .collect();

        ListFrame {
            spacer_height: options.with_count(items.len()).total_size(),
            block_top: window.top_offset,
            window,
            rendered: range,
            rows,
            container: self.container.clone(),
        }
    }
}

impl Drop for VirtualList {
    fn drop(&mut self) {
        self.stop_watch();
    }
}

impl core::fmt::Debug for VirtualList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = self.shared.borrow();
        f.debug_struct("VirtualList")
            .field("windower", &s.windower)
            .field("detached", &s.detached)
            .field("recomputes", &s.recomputes)
            .field("watch", &self.watch)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
