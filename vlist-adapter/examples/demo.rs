// Example: interactive virtualized list demo.
//
// Reads commands from stdin and prints the rendered frame after each one:
//
//   items 10|1000|5000|10000    replace the list
//   height 100|200              item height in px
//   threshold 0|2000            overscan in px
//   scroll <px>                 scroll the container
//   resize <height> <width>     resize the container
//   tick <ms>                   advance the clock (polling + row loading)
//   native on|off               re-attach with/without native resize observation
//   quit
use std::cell::Cell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use vlist::{ItemKey, Rect, WindowOptions};
use vlist_adapter::{
    ContainerProps, DEFAULT_LOADING_DELAY_MS, LoadingFlip, Notify, OnCancel, ScrollSurface,
    Subscription, TickScheduler, VirtualList,
};

const ITEM_PRESETS: [usize; 4] = [10, 1000, 5000, 10_000];
const HEIGHT_PRESETS: [u32; 2] = [100, 200];
const THRESHOLD_PRESETS: [u32; 2] = [0, 2000];

struct DataItem {
    text: String,
    image: String,
}

fn create_list(size: usize) -> Vec<DataItem> {
    (0..size)
        .map(|index| DataItem {
            image: format!("https://picsum.photos/seed/{index}/50"),
            text: format!("Item {index}"),
        })
        .collect()
}

/// A simulated scroll container. Native observation is a flag so both paths can be tried.
struct DemoSurface {
    rect: Cell<Rect>,
    offset: Cell<u64>,
    native: bool,
    observer: Rc<Cell<Option<Notify>>>,
}

impl DemoSurface {
    fn new(native: bool, rect: Rect, offset: u64) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            offset: Cell::new(offset),
            native,
            observer: Rc::new(Cell::new(None)),
        })
    }

    fn resize(&self, rect: Rect) {
        self.rect.set(rect);
        if let Some(notify) = self.observer.take() {
            notify();
            self.observer.set(Some(notify));
        }
    }
}

impl ScrollSurface for DemoSurface {
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
        self.observer.set(Some(notify));
        let observer = Rc::clone(&self.observer);
        Some(Box::new(OnCancel::new(move || observer.set(None))))
    }
}

struct Demo {
    items: Vec<DataItem>,
    list: VirtualList,
    surface: Rc<DemoSurface>,
    timer: TickScheduler,
    loading: HashMap<ItemKey, LoadingFlip>,
}

impl Demo {
    fn new() -> Self {
        let timer = TickScheduler::new();
        let surface = DemoSurface::new(true, Rect::new(500, 800), 0);
        let mut list = VirtualList::new(WindowOptions::new(0, 100).with_threshold(2000))
            .with_container(
                ContainerProps::default().with_style("border: 1px solid silver; height: 500px"),
            );
        list.attach(surface.clone(), &timer);
        Self {
            items: create_list(10_000),
            list,
            surface,
            timer,
            loading: HashMap::new(),
        }
    }

    fn reattach(&mut self, native: bool) {
        let surface = DemoSurface::new(native, self.surface.rect.get(), self.surface.offset.get());
        self.list.attach(surface.clone(), &self.timer);
        self.surface = surface;
    }

    fn command(&mut self, line: &str) -> Result<bool, String> {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(true);
        };
        let mut arg = |name: &str| -> Result<u64, String> {
            parts
                .next()
                .ok_or_else(|| format!("missing {name}"))?
                .parse::<u64>()
                .map_err(|e| format!("bad {name}: {e}"))
        };

        match cmd {
            "items" => {
                let n = arg("count")? as usize;
                if !ITEM_PRESETS.contains(&n) {
                    return Err(format!("items must be one of {ITEM_PRESETS:?}"));
                }
                self.items = create_list(n);
            }
            "height" => {
                let h = u32::try_from(arg("height")?).map_err(|e| e.to_string())?;
                if !HEIGHT_PRESETS.contains(&h) {
                    return Err(format!("height must be one of {HEIGHT_PRESETS:?}"));
                }
                self.list.set_item_height(h);
            }
            "threshold" => {
                let t = u32::try_from(arg("threshold")?).map_err(|e| e.to_string())?;
                if !THRESHOLD_PRESETS.contains(&t) {
                    return Err(format!("threshold must be one of {THRESHOLD_PRESETS:?}"));
                }
                self.list.set_threshold(t);
            }
            "scroll" => {
                self.surface.offset.set(arg("offset")?);
                self.list.on_scroll();
            }
            "resize" => {
                let h = u32::try_from(arg("height")?).map_err(|e| e.to_string())?;
                let w = u32::try_from(arg("width")?).map_err(|e| e.to_string())?;
                self.surface.resize(Rect::new(h, w));
            }
            "tick" => {
                let now = self.timer.now_ms().saturating_add(arg("ms")?);
                self.timer.tick(now);
            }
            "native" => match parts.next() {
                Some("on") => self.reattach(true),
                Some("off") => self.reattach(false),
                _ => return Err("native takes on|off".to_string()),
            },
            "quit" | "exit" => return Ok(false),
            other => return Err(format!("unknown command: {other}")),
        }
        Ok(true)
    }

    /// Starts a loading flip for rows entering the window and cancels rows that left it.
    fn sync_loading(&mut self, keys: &[ItemKey]) {
        let now = self.timer.now_ms();
        self.loading.retain(|key, flip| {
            let keep = keys.contains(key);
            if !keep {
                flip.cancel();
            }
            keep
        });
        for key in keys {
            self.loading
                .entry(*key)
                .or_insert_with(|| LoadingFlip::new(now, DEFAULT_LOADING_DELAY_MS))
                .tick(now);
        }
    }

    fn print_frame(&mut self, out: &mut impl Write) -> io::Result<()> {
        let frame = self.list.render(&self.items, |item| {
            (item.text.clone(), item.image.clone())
        });
        let keys: Vec<ItemKey> = frame.keys().collect();
        self.sync_loading(&keys);

        let options = self.list.options();
        writeln!(
            out,
            "Threshold: {}, items: {}, item height: {}",
            options.threshold,
            self.items.len(),
            options.item_height
        )?;
        writeln!(
            out,
            "container style=\"{}\" mechanism={:?} scroll={} viewport={}",
            frame.container.merged_style(),
            self.list.mechanism(),
            self.list.viewport_state().scroll_offset,
            self.list.viewport_state().viewport_height,
        )?;
        writeln!(
            out,
            "spacer={}px block_top={}px rows={} (indices {:?}, window {}..={})",
            frame.spacer_height,
            frame.block_top,
            frame.rows.len(),
            frame.rendered,
            frame.window.start_index,
            frame.window.end_index,
        )?;

        const SHOWN: usize = 5;
        for row in frame.rows.iter().take(SHOWN) {
            let (text, image) = &row.node;
            let loaded = self.loading.get(&row.key).is_some_and(LoadingFlip::is_loaded);
            let label = if loaded { text.as_str() } else { "Loading..." };
            writeln!(out, "  [{}] {label} <{image}>", row.key)?;
        }
        if frame.rows.len() > SHOWN {
            writeln!(out, "  ... {} more", frame.rows.len() - SHOWN)?;
        }
        Ok(())
    }
}

fn main() -> io::Result<()> {
    let mut demo = Demo::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    demo.print_frame(&mut stdout)?;
    for line in stdin.lock().lines() {
        match demo.command(&line?) {
            Ok(true) => demo.print_frame(&mut stdout)?,
            Ok(false) => break,
            Err(e) => writeln!(stdout, "error: {e}")?,
        }
        stdout.flush()?;
    }
    Ok(())
}
