use crate::*;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use vlist::{Align, Rect, VisibleWindow, WindowOptions};

type Observers = Rc<RefCell<Vec<(u64, Notify)>>>;

/// A scroll surface whose size and offset are set by the test.
struct FakeSurface {
    rect: Cell<Rect>,
    offset: Cell<u64>,
    native: bool,
    next_id: Cell<u64>,
    observers: Observers,
    // Every notify ever handed out, including cancelled ones.
    stale: RefCell<Vec<Notify>>,
}

impl FakeSurface {
    fn new(native: bool, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            offset: Cell::new(0),
            native,
            next_id: Cell::new(0),
            observers: Rc::default(),
            stale: RefCell::default(),
        })
    }

    fn resize(&self, rect: Rect) {
        self.rect.set(rect);
        self.fire();
    }

    fn fire(&self) {
        let observers: Vec<Notify> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, n)| Rc::clone(n))
            .collect();
        for notify in observers {
            notify();
        }
    }

    fn fire_stale(&self) {
        let stale: Vec<Notify> = self.stale.borrow().iter().map(Rc::clone).collect();
        for notify in stale {
            notify();
        }
    }

    fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl ScrollSurface for FakeSurface {
    fn scroll_offset(&self) -> u64 {
        self.offset.get()
    }

    fn content_rect(&self) -> Rect {
        self.rect.get()
    }

    fn observe_resize(&self, notify: Notify) -> Option<Box<dyn Subscription>> {
        if !self.native {
            return None;
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.stale.borrow_mut().push(Rc::clone(&notify));
        self.observers.borrow_mut().push((id, notify));
        let observers = Rc::clone(&self.observers);
        Some(Box::new(OnCancel::new(move || {
            observers.borrow_mut().retain(|(i, _)| *i != id);
        })))
    }
}

fn size_log() -> (Rc<RefCell<Vec<Rect>>>, impl FnMut(Rect) + 'static) {
    let log = Rc::new(RefCell::new(Vec::<Rect>::new()));
    let sink = {
        let log = Rc::clone(&log);
        move |rect: Rect| log.borrow_mut().push(rect)
    };
    (log, sink)
}

fn items(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Item {i}")).collect()
}

fn attached_list(
    options: WindowOptions,
    surface: &Rc<FakeSurface>,
    timer: &TickScheduler,
) -> VirtualList {
    let mut list = VirtualList::new(options);
    let dyn_surface: Rc<dyn ScrollSurface> = surface.clone();
    list.attach(dyn_surface, timer);
    list
}

#[test]
fn tracker_reports_initial_size_then_only_changes() {
    let surface = FakeSurface::new(true, Rect::new(0, 0));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();

    let watch = watch_viewport(surface.clone(), &timer, sink);
    assert_eq!(watch.mechanism(), ResizeMechanism::Native);
    assert_eq!(timer.active_intervals(), 0);
    assert_eq!(*log.borrow(), [Rect::new(0, 0)]);

    surface.resize(Rect::new(500, 800));
    assert_eq!(*log.borrow(), [Rect::new(0, 0), Rect::new(500, 800)]);

    // Same size again: nothing new.
    surface.resize(Rect::new(500, 800));
    surface.fire();
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn tracker_fires_on_width_only_change() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();
    let _watch = watch_viewport(surface.clone(), &timer, sink);

    surface.resize(Rect::new(500, 640));
    assert_eq!(log.borrow().last().copied(), Some(Rect::new(500, 640)));
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn tracker_falls_back_to_polling() {
    let surface = FakeSurface::new(false, Rect::new(100, 50));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();

    let watch = watch_viewport(surface.clone(), &timer, sink);
    assert_eq!(watch.mechanism(), ResizeMechanism::Polling);
    assert_eq!(timer.active_intervals(), 1);
    assert_eq!(log.borrow().len(), 1);

    surface.resize(Rect::new(200, 50));
    assert_eq!(log.borrow().len(), 1);

    assert_eq!(timer.tick(100), 0);
    assert_eq!(log.borrow().len(), 1);

    assert_eq!(timer.tick(POLL_INTERVAL_MS), 1);
    assert_eq!(log.borrow().last().copied(), Some(Rect::new(200, 50)));

    // The timer keeps firing, but an unchanged size reports nothing.
    assert_eq!(timer.tick(2 * POLL_INTERVAL_MS), 1);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn stop_is_idempotent_and_releases_the_observer() {
    let surface = FakeSurface::new(true, Rect::new(0, 0));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();

    let mut watch = watch_viewport(surface.clone(), &timer, sink);
    assert_eq!(surface.observer_count(), 1);

    watch.stop();
    watch.stop();
    assert!(!watch.is_active());
    assert_eq!(surface.observer_count(), 0);

    // A late notification from the host is swallowed.
    surface.rect.set(Rect::new(500, 800));
    surface.fire_stale();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn stop_cancels_the_polling_timer() {
    let surface = FakeSurface::new(false, Rect::new(0, 0));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();

    let mut watch = watch_viewport(surface.clone(), &timer, sink);
    watch.stop();
    assert_eq!(timer.active_intervals(), 0);

    surface.rect.set(Rect::new(500, 800));
    assert_eq!(timer.tick(10 * POLL_INTERVAL_MS), 0);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn dropping_the_watch_stops_it() {
    let surface = FakeSurface::new(false, Rect::new(0, 0));
    let timer = TickScheduler::new();
    let (log, sink) = size_log();

    drop(watch_viewport(surface.clone(), &timer, sink));
    assert_eq!(timer.active_intervals(), 0);
    surface.rect.set(Rect::new(1, 1));
    timer.tick(1000);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn size_filter_reports_first_rect_even_when_empty() {
    let mut filter = SizeFilter::new();
    assert!(filter.changed(Rect::default()));
    assert!(!filter.changed(Rect::default()));
    assert!(filter.changed(Rect::new(0, 1)));
    assert_eq!(filter.last(), Some(Rect::new(0, 1)));
}

#[test]
fn scheduler_skips_intervals_cancelled_mid_tick() {
    let timer = TickScheduler::new();
    let fired = Rc::new(Cell::new(0u32));
    let victim: Rc<RefCell<Option<Box<dyn Subscription>>>> = Rc::default();

    let _killer = timer.set_interval(10, {
        let victim = Rc::clone(&victim);
        Rc::new(move || {
            if let Some(mut sub) = victim.borrow_mut().take() {
                sub.cancel();
            }
        })
    });
    let handle = timer.set_interval(10, {
        let fired = Rc::clone(&fired);
        Rc::new(move || fired.set(fired.get() + 1))
    });
    *victim.borrow_mut() = Some(handle);

    assert_eq!(timer.tick(10), 1);
    assert_eq!(fired.get(), 0);
    assert_eq!(timer.active_intervals(), 1);
}

#[test]
fn scheduler_clock_never_goes_backwards() {
    let timer = TickScheduler::new();
    timer.tick(500);
    timer.tick(100);
    assert_eq!(timer.now_ms(), 500);

    // Registered at t=500, so it is due at t=800.
    let fired = Rc::new(Cell::new(0u32));
    let _sub = timer.set_interval(300, {
        let fired = Rc::clone(&fired);
        Rc::new(move || fired.set(fired.get() + 1))
    });
    timer.tick(700);
    assert_eq!(fired.get(), 0);
    timer.tick(800);
    assert_eq!(fired.get(), 1);
}

#[test]
fn list_renders_visible_slice_with_index_keys() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    surface.offset.set(250);
    let timer = TickScheduler::new();
    let data = items(10_000);

    let mut list = attached_list(WindowOptions::new(0, 100), &surface, &timer);
    assert_eq!(list.mechanism(), Some(ResizeMechanism::Native));

    let frame = list.render(&data, |s| s.clone());
    assert_eq!(frame.spacer_height, 1_000_000);
    assert_eq!(frame.block_top, 250);
    assert_eq!(frame.keys().collect::<Vec<_>>(), (2u64..=8).collect::<Vec<_>>());
    assert_eq!(frame.rows[0].node, "Item 2");
    assert_eq!(frame.rows[6].node, "Item 8");
    assert!(frame.rows.iter().all(|r| r.key == r.index as u64));
}

#[test]
fn list_applies_threshold_overscan() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let data = items(10_000);

    let mut list = attached_list(
        WindowOptions::new(0, 100).with_threshold(2000),
        &surface,
        &timer,
    );
    let frame = list.render(&data, |s| s.len());
    assert_eq!(frame.window.start_index, 0);
    assert_eq!(frame.window.end_index, 45);
    assert_eq!(frame.rows.len(), 46);
    assert_eq!(frame.block_top, 0);
}

#[test]
fn render_item_runs_once_per_visible_item() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let data = items(10_000);
    let mut list = attached_list(WindowOptions::new(0, 200), &surface, &timer);

    let mut calls = 0;
    let frame = list.render(&data, |_| calls += 1);
    // top = 0, bottom = 500: rows 0..=3
    assert_eq!(calls, 4);
    assert_eq!(frame.rows.len(), 4);
}

#[test]
fn sliding_window_keeps_overlapping_keys() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    surface.offset.set(250);
    let timer = TickScheduler::new();
    let data = items(10_000);
    let mut list = attached_list(WindowOptions::new(0, 100), &surface, &timer);

    let before: Vec<u64> = list.render(&data, |_| ()).keys().collect();
    surface.offset.set(350);
    list.on_scroll();
    let after: Vec<u64> = list.render(&data, |_| ()).keys().collect();

    assert_eq!(before.first(), Some(&2));
    assert_eq!(after, (3u64..=9).collect::<Vec<_>>());
    assert!(after.iter().filter(|k| before.contains(k)).count() == 6);
}

#[test]
fn short_lists_are_clipped_to_their_items() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let data = items(10);
    let mut list = attached_list(
        WindowOptions::new(0, 100).with_threshold(2000),
        &surface,
        &timer,
    );

    let frame = list.render(&data, |s| s.clone());
    assert_eq!(frame.rows.len(), 10);
    assert_eq!(frame.spacer_height, 1000);
    assert_eq!(list.options().count, 10);
    // The raw window overshoots the data; the rendered range never does.
    assert_eq!(frame.window.end_index, 45);
    assert_eq!(frame.rendered, 0..10);

    // Scrolled past the end of a shrunk list: nothing to render, never a panic.
    list.on_scroll_offset(50_000);
    let frame = list.render(&data[..3], |s| s.clone());
    assert!(frame.rows.is_empty());
    assert!(frame.rendered.is_empty());
    assert!(frame.rendered.end <= 3);
    assert_eq!(frame.spacer_height, 300);
}

#[test]
fn zero_item_height_renders_nothing() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let data = items(10);
    let mut list = attached_list(WindowOptions::new(0, 0), &surface, &timer);

    let mut calls = 0;
    let frame = list.render(&data, |_| calls += 1);
    assert_eq!(calls, 0);
    assert!(frame.rows.is_empty());
    assert!(frame.rendered.is_empty());
    assert!(frame.window.is_degenerate());
    assert_eq!(frame.spacer_height, 0);
}

#[test]
fn resize_and_scroll_recompute_the_window() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    surface.offset.set(250);
    let timer = TickScheduler::new();
    let mut list = attached_list(WindowOptions::new(10_000, 100), &surface, &timer);

    let seen: Rc<RefCell<Vec<VisibleWindow>>> = Rc::default();
    list.set_on_window_change({
        let seen = Rc::clone(&seen);
        move |w| seen.borrow_mut().push(w)
    });

    surface.resize(Rect::new(1000, 800));
    // top = 250, bottom = 1250
    assert_eq!(seen.borrow().last().map(|w| w.end_index), Some(13));
    assert_eq!(list.viewport_state().viewport_height, 1000);

    surface.offset.set(300);
    list.on_scroll();
    assert_eq!(seen.borrow().last().map(|w| w.start_index), Some(3));

    // A scroll event that did not move anything recomputes nothing.
    let recomputes = list.recompute_count();
    list.on_scroll();
    assert_eq!(list.recompute_count(), recomputes);
    assert_eq!(seen.borrow().len(), 2);

    // Recomputation continues without a listener.
    list.clear_on_window_change();
    list.on_scroll_offset(900);
    assert_eq!(list.recompute_count(), recomputes + 1);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn detach_stops_all_recomputation() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let mut list = attached_list(WindowOptions::new(10_000, 100), &surface, &timer);

    let calls = Rc::new(Cell::new(0u32));
    list.set_on_window_change({
        let calls = Rc::clone(&calls);
        move |_| calls.set(calls.get() + 1)
    });

    list.detach();
    list.detach();
    assert!(!list.is_attached());
    assert_eq!(surface.observer_count(), 0);

    let recomputes = list.recompute_count();
    let window = list.window();

    surface.resize(Rect::new(900, 800));
    surface.fire_stale();
    surface.offset.set(4000);
    list.on_scroll();
    list.on_scroll_offset(7000);

    assert_eq!(list.recompute_count(), recomputes);
    assert_eq!(list.window(), window);
    assert_eq!(calls.get(), 0);
}

#[test]
fn polling_list_tracks_size_on_timer_ticks() {
    let surface = FakeSurface::new(false, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let list = attached_list(WindowOptions::new(10_000, 100), &surface, &timer);
    assert_eq!(list.mechanism(), Some(ResizeMechanism::Polling));
    assert_eq!(list.viewport_state().viewport_height, 500);

    surface.rect.set(Rect::new(200, 800));
    timer.tick(POLL_INTERVAL_MS);
    assert_eq!(list.viewport_state().viewport_height, 200);

    drop(list);
    assert_eq!(timer.active_intervals(), 0);
}

#[test]
fn scroll_to_index_moves_the_window() {
    let surface = FakeSurface::new(true, Rect::new(500, 800));
    let timer = TickScheduler::new();
    let mut list = attached_list(WindowOptions::new(1000, 100), &surface, &timer);

    assert_eq!(list.scroll_to_index(100, Align::Start), 10_000);
    assert_eq!(list.window().start_index, 100);
    assert_eq!(list.scroll_to_index(5000, Align::Start), 99_500);
}

#[test]
fn option_updates_recompute_once() {
    let mut list = VirtualList::new(WindowOptions::new(100, 100));
    list.on_viewport_height(500);
    let recomputes = list.recompute_count();

    list.set_options(WindowOptions::new(100, 200).with_threshold(2000));
    assert_eq!(list.recompute_count(), recomputes + 1);
    list.set_item_height(200);
    list.set_threshold(2000);
    assert_eq!(list.recompute_count(), recomputes + 1);
    list.set_count(5);
    assert_eq!(list.options().count, 5);
}

#[test]
fn container_props_pass_through() {
    let props = ContainerProps::default()
        .with_class("list")
        .with_style("border: 1px solid silver; height: 500px");
    assert_eq!(
        props.merged_style(),
        "border: 1px solid silver; height: 500px; overflow: auto; position: relative;"
    );
    assert_eq!(
        ContainerProps::default().with_style("height: 500px;").merged_style(),
        "height: 500px; overflow: auto; position: relative;"
    );
    assert_eq!(ContainerProps::default().merged_style(), CONTAINER_STYLE);

    let mut list = VirtualList::new(WindowOptions::new(0, 100)).with_container(props.clone());
    let frame = list.render(&items(3), |s| s.clone());
    assert_eq!(frame.container, props);
}

#[test]
fn loading_flip_transitions_once() {
    let mut flip = LoadingFlip::new(1000, DEFAULT_LOADING_DELAY_MS);
    assert_eq!(flip.state(), LoadState::Loading);
    assert!(!flip.tick(1199));
    assert!(flip.tick(1200));
    assert!(flip.is_loaded());
    assert!(!flip.tick(5000));
}

#[test]
fn cancelled_loading_flip_never_loads() {
    let mut flip = LoadingFlip::new(0, 200);
    flip.cancel();
    assert!(!flip.tick(10_000));
    assert_eq!(flip.state(), LoadState::Loading);
    assert!(flip.is_cancelled());
}

#[test]
fn on_cancel_runs_exactly_once() {
    let runs = Rc::new(Cell::new(0u32));
    let mut sub = OnCancel::new({
        let runs = Rc::clone(&runs);
        move || runs.set(runs.get() + 1)
    });
    sub.cancel();
    sub.cancel();
    drop(sub);
    assert_eq!(runs.get(), 1);

    let runs2 = Rc::new(Cell::new(0u32));
    drop(OnCancel::new({
        let runs2 = Rc::clone(&runs2);
        move || runs2.set(runs2.get() + 1)
    }));
    assert_eq!(runs2.get(), 1);
}
