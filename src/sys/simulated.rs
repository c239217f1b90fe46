//! An in-memory desktop for driving the controller without a real shell.
//!
//! Every mutation updates the host state first and then returns the events a
//! real shell would deliver for it, in delivery order.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::actor::controller::Event;
use crate::sys::geometry::Rect;
use crate::sys::host::{HostState, WindowHandle, WindowInfo, WindowKind, WorkspaceId};

pub const DEFAULT_WORK_AREA: Rect = Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0);

#[derive(Debug, Clone)]
struct SimWorkspace {
    id: WorkspaceId,
    work_area: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    workspaces: Vec<SimWorkspace>,
    windows: Vec<WindowInfo>,
    next_workspace_id: u64,
}

/// A host shared between the driver that mutates it and the controller
/// that reads it.
pub type SharedHost = Arc<RwLock<SimulatedHost>>;

impl SimulatedHost {
    pub fn new(workspace_count: usize) -> Self {
        let mut host = Self::default();
        for _ in 0..workspace_count {
            host.push_workspace();
        }
        host
    }

    pub fn shared(self) -> SharedHost { Arc::new(RwLock::new(self)) }

    fn push_workspace(&mut self) -> usize {
        self.next_workspace_id += 1;
        self.workspaces.push(SimWorkspace {
            id: WorkspaceId::new(self.next_workspace_id),
            work_area: DEFAULT_WORK_AREA,
        });
        self.workspaces.len() - 1
    }

    pub fn window(&self, handle: WindowHandle) -> Option<WindowInfo> {
        self.windows.iter().find(|w| w.handle == handle).copied()
    }

    pub fn add_workspace(&mut self) -> Vec<Event> {
        let index = self.push_workspace();
        trace!(index, "Simulated workspace added");
        vec![Event::WorkspaceCountChanged(self.workspaces.len())]
    }

    /// Removes the workspace at `index`. Its windows move to the previous
    /// workspace (or the new first one); windows further right shift down.
    pub fn remove_workspace(&mut self, index: usize) -> Vec<Event> {
        if index >= self.workspaces.len() {
            return Vec::new();
        }
        self.workspaces.remove(index);
        let fallback = (!self.workspaces.is_empty()).then(|| index.saturating_sub(1));

        let mut rehomed = Vec::new();
        for window in &mut self.windows {
            match window.workspace {
                Some(ws) if ws == index => {
                    window.workspace = fallback;
                    rehomed.push(*window);
                }
                Some(ws) if ws > index => window.workspace = Some(ws - 1),
                _ => {}
            }
        }

        let mut events = vec![Event::WorkspaceCountChanged(self.workspaces.len())];
        events.extend(rehomed.into_iter().filter_map(|window| {
            Some(Event::WindowAdded { workspace: window.workspace?, window })
        }));
        events
    }

    pub fn open_window(
        &mut self,
        handle: WindowHandle,
        workspace: usize,
        kind: WindowKind,
        on_all_workspaces: bool,
    ) -> Vec<Event> {
        if self.window(handle).is_some() || workspace >= self.workspaces.len() {
            return Vec::new();
        }
        let window = WindowInfo {
            handle,
            kind,
            workspace: Some(workspace),
            on_all_workspaces,
        };
        self.windows.push(window);
        vec![Event::WindowAdded { workspace, window }]
    }

    pub fn close_window(&mut self, handle: WindowHandle) -> Vec<Event> {
        let Some(pos) = self.windows.iter().position(|w| w.handle == handle) else {
            return Vec::new();
        };
        let window = self.windows.remove(pos);
        match window.workspace {
            Some(workspace) => vec![Event::WindowRemoved { workspace, window }],
            None => Vec::new(),
        }
    }

    pub fn move_window(&mut self, handle: WindowHandle, to: usize) -> Vec<Event> {
        if to >= self.workspaces.len() {
            return Vec::new();
        }
        let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) else {
            return Vec::new();
        };
        let Some(from) = window.workspace.replace(to) else {
            return vec![Event::WindowAdded { workspace: to, window: *window }];
        };
        if from == to {
            return Vec::new();
        }
        vec![Event::WindowMoved { window: *window, from, to }]
    }

    pub fn focus_window(&mut self, handle: WindowHandle) -> Vec<Event> {
        match self.window(handle).and_then(|w| w.workspace) {
            Some(workspace) => vec![Event::WindowFocused { workspace, window: handle }],
            None => Vec::new(),
        }
    }

    pub fn set_work_area(&mut self, index: usize, area: Rect) -> Vec<Event> {
        let Some(workspace) = self.workspaces.get_mut(index) else {
            return Vec::new();
        };
        workspace.work_area = area;
        vec![Event::WorkAreaChanged(index)]
    }
}

impl HostState for SimulatedHost {
    fn workspace_count(&self) -> usize { self.workspaces.len() }

    fn workspace_at(&self, index: usize) -> Option<WorkspaceId> {
        self.workspaces.get(index).map(|w| w.id)
    }

    fn windows(&self) -> Vec<WindowInfo> { self.windows.clone() }

    fn work_area(&self, index: usize) -> Option<Rect> {
        self.workspaces.get(index).map(|w| w.work_area)
    }
}

impl HostState for SharedHost {
    fn workspace_count(&self) -> usize { self.read().workspace_count() }

    fn workspace_at(&self, index: usize) -> Option<WorkspaceId> { self.read().workspace_at(index) }

    fn windows(&self) -> Vec<WindowInfo> { self.read().windows() }

    fn work_area(&self, index: usize) -> Option<Rect> { self.read().work_area(index) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn w(raw: u64) -> WindowHandle { WindowHandle::new(raw) }

    #[test]
    fn removing_a_workspace_rehomes_and_shifts_windows() {
        let mut host = SimulatedHost::new(3);
        let second = host.workspace_at(1);
        host.open_window(w(1), 0, WindowKind::Normal, false);
        host.open_window(w(2), 1, WindowKind::Normal, false);
        host.open_window(w(3), 2, WindowKind::Normal, false);

        let events = host.remove_workspace(1);
        assert_eq!(events, vec![
            Event::WorkspaceCountChanged(2),
            Event::WindowAdded {
                workspace: 0,
                window: WindowInfo::normal(w(2), 0)
            },
        ]);
        assert_ne!(host.workspace_at(1), second);
        assert_eq!(host.window(w(3)).and_then(|w| w.workspace), Some(1));
    }

    #[test]
    fn moves_and_closes_report_the_old_workspace() {
        let mut host = SimulatedHost::new(2);
        host.open_window(w(1), 0, WindowKind::Normal, false);
        assert_eq!(host.move_window(w(1), 1), vec![Event::WindowMoved {
            window: WindowInfo::normal(w(1), 1),
            from: 0,
            to: 1
        }]);
        assert!(host.move_window(w(1), 1).is_empty());
        assert_eq!(host.close_window(w(1)), vec![Event::WindowRemoved {
            workspace: 1,
            window: WindowInfo::normal(w(1), 1)
        }]);
        assert!(host.close_window(w(1)).is_empty());
    }

    #[test]
    fn shared_host_reads_through_the_lock() {
        let shared = SimulatedHost::new(1).shared();
        shared.write().add_workspace();
        assert_eq!(HostState::workspace_count(&shared), 2);
        assert_eq!(shared.work_area(1), Some(DEFAULT_WORK_AREA));
    }
}
