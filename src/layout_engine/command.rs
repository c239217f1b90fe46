use serde::{Deserialize, Serialize};

use crate::layout_engine::{InsertAction, TilingMode};
use crate::sys::host::WindowHandle;

/// User-level operations on a workspace tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    /// Grow (or with a negative amount, shrink) the window's side of its
    /// enclosing split.
    ResizeWindow { window: WindowHandle, amount: f32 },
    SetLeafMode { window: WindowHandle, mode: TilingMode },
    /// Override the insertion action for the next window on a workspace.
    Preselect { workspace: usize, action: Option<InsertAction> },
    Rebalance { workspace: usize },
    FocusWindow { workspace: usize, window: WindowHandle },
    DebugTree { workspace: usize },
}
