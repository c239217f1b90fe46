use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Children side by side.
    Horizontal,
    /// Children stacked top to bottom.
    Vertical,
}

impl Orientation {
    /// Orientation of a split occupying `rect`. Wide (and square) rectangles
    /// split side by side, tall ones top to bottom.
    pub fn for_rect(rect: &Rect) -> Self {
        if rect.size.width >= rect.size.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// How the windows of a single leaf share its region.
#[derive(
    Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TilingMode {
    /// Overlapping windows, one visible at a time, switched by activation.
    #[default]
    Stack,
    /// Overlapping windows switched by a tab strip.
    Tab,
    /// Reserved. Behaves as [`TilingMode::Stack`].
    Split,
}

impl TilingMode {
    pub fn effective(self) -> TilingMode {
        match self {
            TilingMode::Split => TilingMode::Stack,
            mode => mode,
        }
    }
}

/// What happens to the target leaf when a window is inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertAction {
    /// Split the leaf into a branch, new window in the second child.
    Split,
    /// Push the window onto the leaf's stack.
    Stack,
}

/// Where a window lands when the caller gives no explicit hint.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionPolicy {
    /// Split the leaf holding the focused (or most recently touched) window.
    #[default]
    SplitFocused,
    /// Stack onto the leaf reached by always following the first child.
    AppendFirst,
}

impl InsertionPolicy {
    pub fn action(self) -> InsertAction {
        match self {
            InsertionPolicy::SplitFocused => InsertAction::Split,
            InsertionPolicy::AppendFirst => InsertAction::Stack,
        }
    }
}
