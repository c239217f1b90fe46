use crate::common::config::GapSettings;
use crate::sys::geometry::Rect;

/// The screen area left for tiling once the outer gap is taken off every
/// side. May be degenerate on tiny screens or with huge gaps.
pub fn compute_tiling_area(screen: Rect, gaps: &GapSettings) -> Rect {
    let outer = gaps.outer_px();
    if outer == 0.0 { screen } else { screen.inset(outer) }
}
