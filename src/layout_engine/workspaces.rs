use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::command::LayoutCommand;
use super::error::LayoutError;
use super::tree::{InsertOptions, LayoutTree, move_window};
use crate::common::config::LayoutSettings;
use crate::sys::host::{HostState, WindowHandle, WindowInfo, WorkspaceId};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkspaceEntry {
    pub id: WorkspaceId,
    pub tree: LayoutTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceChange {
    Unchanged,
    Added(Range<usize>),
    Removed { start: usize, count: usize },
}

/// One layout tree per workspace, indexed by workspace position.
///
/// Workspaces appear and disappear in contiguous blocks; the registry never
/// reorders entries.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct WorkspaceRegistry {
    entries: Vec<WorkspaceEntry>,
}

fn insert_options(settings: &LayoutSettings) -> InsertOptions {
    InsertOptions {
        policy: settings.insertion,
        mode: settings.default_mode,
    }
}

impl WorkspaceRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn identity(&self, index: usize) -> Option<WorkspaceId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn tree(&self, index: usize) -> Option<&LayoutTree> {
        self.entries.get(index).map(|e| &e.tree)
    }

    pub fn entries(&self) -> &[WorkspaceEntry] { &self.entries }

    pub fn workspace_of(&self, window: WindowHandle) -> Option<usize> {
        self.entries.iter().position(|e| e.tree.contains(window))
    }

    fn tree_mut(&mut self, index: usize) -> Result<&mut LayoutTree, LayoutError> {
        self.entries
            .get_mut(index)
            .map(|e| &mut e.tree)
            .ok_or(LayoutError::UnknownWorkspace(index))
    }

    /// Reconciles the registry with the host after the workspace count
    /// changed. On error the registry is left untouched.
    pub fn on_workspace_count_changed(
        &mut self,
        new_count: usize,
        host: &dyn HostState,
        settings: &LayoutSettings,
    ) -> Result<WorkspaceChange, LayoutError> {
        let old_count = self.entries.len();
        if new_count > old_count {
            let ids = (old_count..new_count)
                .map(|i| host.workspace_at(i).ok_or(LayoutError::MissingWorkspaceIdentity(i)))
                .collect::<Result<Vec<_>, _>>()?;
            let windows = host.windows();
            for (index, id) in (old_count..new_count).zip(ids) {
                let mut tree = LayoutTree::new(settings.default_mode);
                for window in windows.iter().filter(|w| w.is_tileable() && w.workspace == Some(index))
                {
                    tree.insert_window(window.handle, None, insert_options(settings));
                }
                debug!(index, ?id, windows = tree.window_count(), "Created workspace tree");
                self.entries.push(WorkspaceEntry { id, tree });
            }
            info!(old_count, new_count, "Workspaces added");
            Ok(WorkspaceChange::Added(old_count..new_count))
        } else if new_count < old_count {
            let count = old_count - new_count;
            let start = (0..old_count).find(|&i| host.workspace_at(i) != Some(self.entries[i].id));
            let Some(start) = start.filter(|s| s + count <= old_count) else {
                return Err(LayoutError::InconsistentWorkspaceState { old: old_count, new: new_count });
            };
            for entry in self.entries.drain(start..start + count) {
                debug!(id = ?entry.id, windows = entry.tree.window_count(), "Dropped workspace tree");
            }
            info!(old_count, new_count, start, "Workspaces removed");
            Ok(WorkspaceChange::Removed { start, count })
        } else {
            trace!(new_count, "Workspace count unchanged");
            Ok(WorkspaceChange::Unchanged)
        }
    }

    /// Returns true if the tree changed.
    pub fn on_window_added(
        &mut self,
        index: usize,
        window: &WindowInfo,
        settings: &LayoutSettings,
    ) -> Result<bool, LayoutError> {
        if !window.is_tileable() {
            trace!(?window, "Ignoring untileable window");
            return Ok(false);
        }
        let tree = self.tree_mut(index)?;
        Ok(tree.insert_window(window.handle, None, insert_options(settings)))
    }

    /// Returns true if the tree changed. Unknown windows are a no-op. The
    /// window's current kind is not consulted, so a window that stopped being
    /// tileable after it was added is still evicted.
    pub fn on_window_removed(
        &mut self,
        index: usize,
        window: &WindowInfo,
    ) -> Result<bool, LayoutError> {
        let tree = self.tree_mut(index)?;
        Ok(tree.remove_window(window.handle))
    }

    pub fn on_window_moved(
        &mut self,
        window: &WindowInfo,
        from: usize,
        to: usize,
        settings: &LayoutSettings,
    ) -> Result<bool, LayoutError> {
        if from == to {
            return Ok(false);
        }
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(LayoutError::UnknownWorkspace(index));
            }
        }
        let (low, high) = self.entries.split_at_mut(from.max(to));
        let (a, b) = (&mut low[from.min(to)].tree, &mut high[0].tree);
        let (source, target) = if from < to { (a, b) } else { (b, a) };
        if !window.is_tileable() {
            trace!(?window, "Untileable window left its workspace");
            return Ok(source.remove_window(window.handle));
        }
        Ok(move_window(source, target, window.handle, insert_options(settings)))
    }

    pub fn on_window_focused(
        &mut self,
        index: usize,
        window: WindowHandle,
    ) -> Result<bool, LayoutError> {
        Ok(self.tree_mut(index)?.focus_window(window))
    }

    /// Applies a command, returning the workspace whose frames need to be
    /// recomputed, if any.
    pub fn handle_command(&mut self, command: LayoutCommand) -> Result<Option<usize>, LayoutError> {
        match command {
            LayoutCommand::ResizeWindow { window, amount } => {
                let Some(index) = self.workspace_of(window) else {
                    return Ok(None);
                };
                let changed = self.tree_mut(index)?.resize_window(window, amount);
                Ok(changed.then_some(index))
            }
            LayoutCommand::SetLeafMode { window, mode } => {
                let Some(index) = self.workspace_of(window) else {
                    return Ok(None);
                };
                let changed = self.tree_mut(index)?.set_leaf_mode(window, mode);
                Ok(changed.then_some(index))
            }
            LayoutCommand::Preselect { workspace, action } => {
                self.tree_mut(workspace)?.set_preselection(action);
                Ok(None)
            }
            LayoutCommand::Rebalance { workspace } => {
                self.tree_mut(workspace)?.rebalance();
                Ok(Some(workspace))
            }
            LayoutCommand::FocusWindow { workspace, window } => {
                self.on_window_focused(workspace, window)?;
                Ok(None)
            }
            LayoutCommand::DebugTree { workspace } => {
                let tree = self.tree_mut(workspace)?;
                info!(workspace, "Layout tree:\n{}", tree.draw_tree());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::node::LayoutNode;
    use crate::layout_engine::{InsertAction, TilingMode};
    use crate::sys::host::WindowKind;
    use crate::sys::simulated::SimulatedHost;

    fn w(raw: u64) -> WindowHandle { WindowHandle::new(raw) }

    fn settings() -> LayoutSettings { LayoutSettings::default() }

    fn registry_for(host: &SimulatedHost) -> WorkspaceRegistry {
        let mut registry = WorkspaceRegistry::new();
        registry
            .on_workspace_count_changed(host.workspace_count(), host, &settings())
            .unwrap();
        registry
    }

    #[test]
    fn growth_eagerly_adopts_tileable_windows_in_host_order() {
        let mut host = SimulatedHost::new(2);
        host.open_window(w(1), 1, WindowKind::Normal, false);
        host.open_window(w(2), 0, WindowKind::Normal, false);
        host.open_window(w(3), 1, WindowKind::Dialog, false);
        host.open_window(w(4), 1, WindowKind::Normal, true);
        host.open_window(w(5), 1, WindowKind::Normal, false);

        let mut registry = WorkspaceRegistry::new();
        let change = registry.on_workspace_count_changed(2, &host, &settings()).unwrap();
        assert_eq!(change, WorkspaceChange::Added(0..2));
        assert_eq!(registry.tree(0).unwrap().windows(), vec![w(2)]);
        assert_eq!(registry.tree(1).unwrap().windows(), vec![w(1), w(5)]);
        assert_eq!(registry.identity(1), host.workspace_at(1));
    }

    #[test]
    fn shrink_removes_the_first_mismatched_workspace() {
        let mut host = SimulatedHost::new(2);
        host.open_window(w(1), 0, WindowKind::Normal, false);
        host.open_window(w(2), 1, WindowKind::Normal, false);
        host.open_window(w(3), 1, WindowKind::Normal, false);
        let mut registry = registry_for(&host);
        let survivor = registry.tree(1).unwrap().root().clone();
        let survivor_id = registry.identity(1);

        host.remove_workspace(0);
        let change = registry.on_workspace_count_changed(1, &host, &settings()).unwrap();
        assert_eq!(change, WorkspaceChange::Removed { start: 0, count: 1 });
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.identity(0), survivor_id);
        assert_eq!(registry.tree(0).unwrap().root(), &survivor);
    }

    #[test]
    fn shrink_at_the_end_removes_the_tail() {
        let mut host = SimulatedHost::new(3);
        let mut registry = registry_for(&host);
        host.remove_workspace(2);
        let change = registry.on_workspace_count_changed(2, &host, &settings()).unwrap();
        assert_eq!(change, WorkspaceChange::Removed { start: 2, count: 1 });
        assert_eq!(registry.identity(0), host.workspace_at(0));
        assert_eq!(registry.identity(1), host.workspace_at(1));
    }

    #[test]
    fn shrink_without_mismatch_is_reported_and_ignored() {
        let host = SimulatedHost::new(2);
        let mut registry = registry_for(&host);
        let err = registry.on_workspace_count_changed(1, &host, &settings()).unwrap_err();
        assert_eq!(err, LayoutError::InconsistentWorkspaceState { old: 2, new: 1 });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn growth_without_identity_leaves_registry_unchanged() {
        let host = SimulatedHost::new(1);
        let mut registry = registry_for(&host);
        let err = registry.on_workspace_count_changed(3, &host, &settings()).unwrap_err();
        assert_eq!(err, LayoutError::MissingWorkspaceIdentity(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn window_events_route_to_the_addressed_tree() {
        let host = SimulatedHost::new(2);
        let mut registry = registry_for(&host);

        let normal = WindowInfo::normal(w(1), 1);
        assert!(registry.on_window_added(1, &normal, &settings()).unwrap());
        assert!(!registry.on_window_added(1, &normal, &settings()).unwrap());
        assert_eq!(registry.workspace_of(w(1)), Some(1));

        let sticky = WindowInfo { on_all_workspaces: true, ..WindowInfo::normal(w(2), 1) };
        assert!(!registry.on_window_added(1, &sticky, &settings()).unwrap());
        let dialog = WindowInfo { kind: WindowKind::Dialog, ..WindowInfo::normal(w(3), 1) };
        assert!(!registry.on_window_added(1, &dialog, &settings()).unwrap());

        assert_eq!(
            registry.on_window_added(5, &WindowInfo::normal(w(4), 5), &settings()),
            Err(LayoutError::UnknownWorkspace(5))
        );

        assert!(!registry.on_window_removed(0, &normal).unwrap());
        assert!(registry.on_window_removed(1, &normal).unwrap());
        assert!(registry.tree(1).unwrap().is_empty());
    }

    #[test]
    fn move_removes_before_inserting() {
        let host = SimulatedHost::new(3);
        let mut registry = registry_for(&host);
        for (raw, ws) in [(1, 2), (2, 2), (3, 0)] {
            registry.on_window_added(ws, &WindowInfo::normal(w(raw), ws), &settings()).unwrap();
        }

        assert!(registry.on_window_moved(&WindowInfo::normal(w(2), 0), 2, 0, &settings()).unwrap());
        assert_eq!(registry.tree(2).unwrap().root(), &LayoutNode::leaf(w(1), TilingMode::Stack));
        assert_eq!(registry.tree(0).unwrap().windows(), vec![w(3), w(2)]);

        assert!(registry.on_window_moved(&WindowInfo::normal(w(3), 1), 0, 1, &settings()).unwrap());
        assert_eq!(registry.tree(1).unwrap().windows(), vec![w(3)]);
        assert_eq!(
            registry.on_window_moved(&WindowInfo::normal(w(3), 7), 1, 7, &settings()),
            Err(LayoutError::UnknownWorkspace(7))
        );
    }

    #[test]
    fn window_that_turned_untileable_is_still_evicted() {
        let host = SimulatedHost::new(2);
        let mut registry = registry_for(&host);
        for raw in 1..=2 {
            registry.on_window_added(0, &WindowInfo::normal(w(raw), 0), &settings()).unwrap();
        }

        let sticky = WindowInfo { on_all_workspaces: true, ..WindowInfo::normal(w(1), 0) };
        assert!(registry.on_window_removed(0, &sticky).unwrap());
        assert_eq!(registry.workspace_of(w(1)), None);
        assert_eq!(registry.tree(0).unwrap().windows(), vec![w(2)]);
        assert_eq!(registry.tree(0).unwrap().check_invariants(), Ok(()));

        let dialog = WindowInfo { kind: WindowKind::Dialog, ..WindowInfo::normal(w(2), 1) };
        assert!(registry.on_window_moved(&dialog, 0, 1, &settings()).unwrap());
        assert!(registry.tree(0).unwrap().is_empty());
        assert!(registry.tree(1).unwrap().is_empty());
        assert_eq!(registry.workspace_of(w(2)), None);
    }

    #[test]
    fn commands_report_the_workspace_to_relayout() {
        let host = SimulatedHost::new(1);
        let mut registry = registry_for(&host);
        for raw in 1..=2 {
            registry.on_window_added(0, &WindowInfo::normal(w(raw), 0), &settings()).unwrap();
        }

        let resize = LayoutCommand::ResizeWindow { window: w(1), amount: 0.1 };
        assert_eq!(registry.handle_command(resize), Ok(Some(0)));
        let unknown = LayoutCommand::ResizeWindow { window: w(9), amount: 0.1 };
        assert_eq!(registry.handle_command(unknown), Ok(None));
        assert_eq!(registry.handle_command(LayoutCommand::Rebalance { workspace: 0 }), Ok(Some(0)));

        let preselect = LayoutCommand::Preselect { workspace: 0, action: Some(InsertAction::Stack) };
        assert_eq!(registry.handle_command(preselect), Ok(None));
        registry.on_window_added(0, &WindowInfo::normal(w(3), 0), &settings()).unwrap();
        assert_eq!(registry.tree(0).unwrap().window_count(), 3);
        assert_eq!(registry.tree(0).unwrap().root().path_to_window(w(3)), Some(vec![1]));

        assert_eq!(
            registry.handle_command(LayoutCommand::DebugTree { workspace: 3 }),
            Err(LayoutError::UnknownWorkspace(3))
        );
    }
}
