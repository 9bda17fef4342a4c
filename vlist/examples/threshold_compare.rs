// Example: how the overscan threshold widens the rendered window.
use vlist::{ViewportState, WindowOptions, compute_window};

fn main() {
    let viewport = ViewportState::new(250, 500);
    for item_height in [100u32, 200] {
        for threshold in [0u32, 2000] {
            let opts = WindowOptions::new(10_000, item_height).with_threshold(threshold);
            let window = compute_window(viewport, &opts);
            println!(
                "item_height={item_height} threshold={threshold} -> {}..={} ({} rows) top={}",
                window.start_index,
                window.end_index,
                window.rendered_len(opts.count),
                window.top_offset,
            );
        }
    }
}
