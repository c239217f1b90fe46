//! Turns a layout tree and a screen rectangle into one frame per window.
//!
//! Resolution is pure: it never mutates the tree and always reads the gap
//! settings it is handed, so a changed config takes effect on the next call.

use tracing::debug;

use crate::common::config::GapSettings;
use crate::layout_engine::node::LayoutNode;
use crate::layout_engine::tree::{DEFAULT_RATIO, LayoutTree, MAX_RATIO, MIN_RATIO};
use crate::layout_engine::utils::compute_tiling_area;
use crate::layout_engine::Orientation;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::host::WindowHandle;

/// Resolves every window in `tree`, in tree order.
pub fn resolve(tree: &LayoutTree, screen: Rect, gaps: &GapSettings) -> Vec<(WindowHandle, Rect)> {
    let mut out = Vec::with_capacity(tree.window_count());
    let area = compute_tiling_area(screen, gaps);
    if area.is_degenerate() {
        pin_all(tree.root(), screen.mid(), &mut out);
    } else {
        resolve_node(tree.root(), area, gaps.inner_px(), &mut out);
    }
    out
}

fn resolve_node(node: &LayoutNode, rect: Rect, gap: f64, out: &mut Vec<(WindowHandle, Rect)>) {
    match node {
        LayoutNode::Leaf { windows, .. } => {
            out.extend(windows.iter().map(|w| (*w, rect)));
        }
        LayoutNode::Branch { children, ratio } => {
            // A NaN ratio survives `clamp`; fall back to an even split.
            let ratio = if ratio.is_finite() { *ratio } else { DEFAULT_RATIO };
            let fraction = ratio.clamp(MIN_RATIO, MAX_RATIO) as f64;
            let (r1, r2) = match Orientation::for_rect(&rect) {
                Orientation::Horizontal => {
                    let available = rect.size.width - gap;
                    let first_w = available * fraction;
                    let second_w = available - first_w;
                    (
                        Rect::new(rect.origin, Size::new(first_w, rect.size.height)),
                        Rect::new(
                            Point::new(rect.origin.x + first_w + gap, rect.origin.y),
                            Size::new(second_w, rect.size.height),
                        ),
                    )
                }
                Orientation::Vertical => {
                    let available = rect.size.height - gap;
                    let first_h = available * fraction;
                    let second_h = available - first_h;
                    (
                        Rect::new(rect.origin, Size::new(rect.size.width, first_h)),
                        Rect::new(
                            Point::new(rect.origin.x, rect.origin.y + first_h + gap),
                            Size::new(rect.size.width, second_h),
                        ),
                    )
                }
            };
            if r1.is_degenerate() || r2.is_degenerate() {
                pin_all(node, rect.mid(), out);
                return;
            }
            resolve_node(&children[0], r1, gap, out);
            resolve_node(&children[1], r2, gap, out);
        }
    }
}

/// Gives every window under `node` a zero-area frame at `point`.
fn pin_all(node: &LayoutNode, point: Point, out: &mut Vec<(WindowHandle, Rect)>) {
    let mut windows = Vec::new();
    node.collect_windows(&mut windows);
    if windows.is_empty() {
        return;
    }
    debug!(?windows, ?point, "Degenerate geometry; pinning windows to zero-area frame");
    out.extend(windows.into_iter().map(|w| (w, Rect::zero_at(point))));
}
