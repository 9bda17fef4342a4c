use crate::{ViewportState, VisibleWindow, WindowOptions};

/// Computes the index window to render for a viewport.
///
/// This is a pure derivation:
///
/// - `top = max(0, scroll_offset - threshold)`
/// - `bottom = top + viewport_height + 2 * threshold`
/// - `start_index = floor(top / item_height)`
/// - `end_index = ceil(bottom / item_height)`, inclusive
/// - `top_offset = top`
///
/// The ceiling division already reaches the row that covers the bottom edge; the inclusive end
/// adds one more row on top of that. `options.count` is not consulted here: the window is
/// clipped when it is sliced, see [`VisibleWindow::rendered_range`].
///
/// An `item_height` of zero is a degenerate configuration and yields
/// [`VisibleWindow::degenerate`], which renders no rows.
pub fn compute_window(viewport: ViewportState, options: &WindowOptions) -> VisibleWindow {
    let threshold = options.threshold as u64;
    let top = viewport.scroll_offset.saturating_sub(threshold);
    let bottom = top
        .saturating_add(viewport.viewport_height as u64)
        .saturating_add(threshold.saturating_mul(2));

    let item_height = options.item_height as u64;
    if item_height == 0 {
        vwarn!(
            scroll_offset = viewport.scroll_offset,
            "compute_window: item_height is zero"
        );
        return VisibleWindow::degenerate(top);
    }

    let start_index = clamp_index(top / item_height);
    let end_index = clamp_index(bottom.div_ceil(item_height));

    VisibleWindow::new(start_index, end_index, top)
}

fn clamp_index(index: u64) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}
