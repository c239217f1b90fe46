//! The contract between the tiling core and the desktop shell that hosts it.
//!
//! The host owns windows and workspaces. The core only ever holds handles to
//! them and asks the host for snapshots through [`HostState`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

/// Opaque identifier for a host window. Referenced, never owned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "w{}", self.0) }
}

/// Stable identity of a workspace, independent of its current index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(u64);

impl WorkspaceId {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub fn get(self) -> u64 { self.0 }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// A normal top-level application window.
    #[default]
    Normal,
    Dialog,
    ModalDialog,
    Utility,
    Splash,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    #[serde(default)]
    pub kind: WindowKind,
    /// Index of the workspace the window is currently on, if any.
    pub workspace: Option<usize>,
    /// Visible on all workspaces ("sticky").
    #[serde(default)]
    pub on_all_workspaces: bool,
}

impl WindowInfo {
    pub fn normal(handle: WindowHandle, workspace: usize) -> Self {
        Self {
            handle,
            kind: WindowKind::Normal,
            workspace: Some(workspace),
            on_all_workspaces: false,
        }
    }

    /// Whether a single workspace tree should track this window.
    pub fn is_tileable(&self) -> bool { self.kind == WindowKind::Normal && !self.on_all_workspaces }
}

/// Read access to the host's current state.
pub trait HostState {
    fn workspace_count(&self) -> usize;

    /// Identity of the workspace currently at `index`, `None` if out of range.
    fn workspace_at(&self, index: usize) -> Option<WorkspaceId>;

    /// Every top-level window, in host enumeration order.
    fn windows(&self) -> Vec<WindowInfo>;

    /// Usable area of the workspace (host-reserved bars already excluded).
    fn work_area(&self, index: usize) -> Option<Rect>;
}
