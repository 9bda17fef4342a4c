// Example: minimal usage and scroll-to helper.
use vlist::{Align, WindowOptions, Windower};

fn main() {
    let mut w = Windower::new(WindowOptions::new(1_000_000, 20).with_threshold(100));
    w.set_viewport_and_scroll(400, 123_456);

    let mut rows = Vec::new();
    w.collect_rows(&mut rows);
    println!("spacer_height={}", w.total_size());
    println!("window={:?}", w.window());
    println!("first_row={:?}", rows.first());
    println!("rendered={}", rows.len());

    let off = w.scroll_to_index_offset(999_999, Align::End);
    w.set_scroll_offset_clamped(off);
    println!("after scroll_to_index: offset={}", w.scroll_offset());
}
