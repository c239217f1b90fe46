use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::common::collections::HashSet;
use crate::layout_engine::node::{LayoutNode, NodePath};
use crate::layout_engine::{InsertAction, InsertionPolicy, TilingMode};
use crate::sys::host::WindowHandle;

pub const DEFAULT_RATIO: f32 = 0.5;
pub const MIN_RATIO: f32 = 0.05;
pub const MAX_RATIO: f32 = 0.95;

/// Explicit insertion target: the leaf holding `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertHint {
    pub target: WindowHandle,
    pub action: InsertAction,
}

/// Settings that shape an insertion, read from the current config on every call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InsertOptions {
    pub policy: InsertionPolicy,
    pub mode: TilingMode,
}

/// The layout of one workspace.
///
/// The root always exists; a workspace without windows is a single empty
/// leaf. Every window appears in exactly one leaf, exactly once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    root: LayoutNode,
    focused: Option<WindowHandle>,
    last_touched: Option<WindowHandle>,
    preselection: Option<InsertAction>,
}

impl LayoutTree {
    pub fn new(mode: TilingMode) -> Self {
        Self {
            root: LayoutNode::empty_leaf(mode),
            ..Default::default()
        }
    }

    /// Wraps an existing node structure, e.g. one restored from disk.
    pub fn from_root(root: LayoutNode) -> Self {
        Self {
            last_touched: root.first_window(),
            root,
            ..Default::default()
        }
    }

    pub fn root(&self) -> &LayoutNode { &self.root }

    pub fn focused(&self) -> Option<WindowHandle> { self.focused }

    pub fn preselection(&self) -> Option<InsertAction> { self.preselection }

    pub fn is_empty(&self) -> bool { self.root.is_empty_leaf() }

    pub fn window_count(&self) -> usize { self.root.window_count() }

    pub fn contains(&self, window: WindowHandle) -> bool { self.root.contains(window) }

    pub fn windows(&self) -> Vec<WindowHandle> {
        let mut out = Vec::new();
        self.root.collect_windows(&mut out);
        out
    }

    /// Overrides the insertion action for the next insert only.
    pub fn set_preselection(&mut self, action: Option<InsertAction>) { self.preselection = action; }

    /// Adds `window` to the tree. Returns false if it was already present.
    pub fn insert_window(
        &mut self,
        window: WindowHandle,
        hint: Option<InsertHint>,
        options: InsertOptions,
    ) -> bool {
        if self.contains(window) {
            debug!(?window, "Window already in layout tree; not inserting again");
            return false;
        }

        let (path, action) = self.insert_target(hint, options.policy);
        let Some(target) = self.root.node_at_mut(&path) else {
            return false;
        };

        let LayoutNode::Leaf { windows, .. } = &mut *target else {
            return false;
        };
        if windows.is_empty() {
            windows.push(window);
        } else if action == InsertAction::Stack {
            windows.insert(0, window);
        } else {
            let existing = std::mem::take(target);
            *target =
                LayoutNode::branch(existing, LayoutNode::leaf(window, options.mode), DEFAULT_RATIO);
        }

        trace!(?window, ?path, ?action, "Inserted window");
        self.last_touched = Some(window);
        true
    }

    fn insert_target(
        &mut self,
        hint: Option<InsertHint>,
        policy: InsertionPolicy,
    ) -> (NodePath, InsertAction) {
        let preselected = self.preselection.take();
        if let Some(hint) = hint
            && let Some(path) = self.root.path_to_window(hint.target)
        {
            return (path, preselected.unwrap_or(hint.action));
        }

        let action = preselected.unwrap_or(policy.action());
        let path = match policy {
            InsertionPolicy::AppendFirst => None,
            InsertionPolicy::SplitFocused => self
                .focused
                .or(self.last_touched)
                .and_then(|w| self.root.path_to_window(w)),
        };
        (path.unwrap_or_else(|| self.root.first_leaf_path()), action)
    }

    /// Removes `window`, collapsing its leaf if that leaves it empty. Returns
    /// false if the window was not in the tree.
    pub fn remove_window(&mut self, window: WindowHandle) -> bool {
        let Some(path) = self.root.path_to_window(window) else {
            trace!(?window, "Removal of unknown window ignored");
            return false;
        };
        let Some(LayoutNode::Leaf { windows, .. }) = self.root.node_at_mut(&path) else {
            return false;
        };
        windows.retain(|w| *w != window);

        let mut anchor = path;
        if self.root.collapse_empty() {
            // The parent branch was replaced by the sibling subtree.
            anchor.pop();
        }

        if self.focused == Some(window) {
            self.focused = None;
        }
        if self.last_touched == Some(window) || self.last_touched.is_none() {
            self.last_touched = self.root.node_at(&anchor).and_then(|n| n.first_window());
        }
        trace!(?window, "Removed window");
        true
    }

    /// Marks `window` focused and brings it to the front of its stack.
    pub fn focus_window(&mut self, window: WindowHandle) -> bool {
        let Some(path) = self.root.path_to_window(window) else {
            return false;
        };
        if let Some(LayoutNode::Leaf { windows, .. }) = self.root.node_at_mut(&path)
            && let Some(pos) = windows.iter().position(|w| *w == window)
        {
            let w = windows.remove(pos);
            windows.insert(0, w);
        }
        self.focused = Some(window);
        self.last_touched = Some(window);
        true
    }

    /// Grows the window's side of its nearest enclosing branch by `amount`
    /// (a fraction of that branch). Returns false if nothing changed.
    pub fn resize_window(&mut self, window: WindowHandle, amount: f32) -> bool {
        // `clamp` passes NaN through, which would poison the branch ratio.
        if !amount.is_finite() {
            return false;
        }
        let Some(mut path) = self.root.path_to_window(window) else {
            return false;
        };
        let Some(side) = path.pop() else {
            return false;
        };
        let Some(LayoutNode::Branch { ratio, .. }) = self.root.node_at_mut(&path) else {
            return false;
        };
        let old = *ratio;
        let delta = if side == 0 { amount } else { -amount };
        *ratio = (old + delta).clamp(MIN_RATIO, MAX_RATIO);
        *ratio != old
    }

    pub fn set_leaf_mode(&mut self, window: WindowHandle, new_mode: TilingMode) -> bool {
        let Some(path) = self.root.path_to_window(window) else {
            return false;
        };
        match self.root.node_at_mut(&path) {
            Some(LayoutNode::Leaf { mode, .. }) => {
                *mode = new_mode;
                true
            }
            _ => false,
        }
    }

    /// Resets every branch to an even split.
    pub fn rebalance(&mut self) { self.root.for_each_ratio_mut(&mut |r| *r = DEFAULT_RATIO); }

    pub fn draw_tree(&self) -> String {
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &self.root.to_ascii()).is_err() {
            return "<unprintable tree>".to_string();
        }
        out
    }

    /// Checks the structural invariants, returning a description of the
    /// first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        fn walk(
            node: &LayoutNode,
            is_root: bool,
            seen: &mut HashSet<WindowHandle>,
        ) -> Result<(), String> {
            match node {
                LayoutNode::Leaf { windows, .. } => {
                    if windows.is_empty() && !is_root {
                        return Err("empty leaf below a branch".to_string());
                    }
                    for w in windows {
                        if !seen.insert(*w) {
                            return Err(format!("window {w} appears more than once"));
                        }
                    }
                    Ok(())
                }
                LayoutNode::Branch { children, ratio } => {
                    if !(*ratio > 0.0 && *ratio < 1.0) {
                        return Err(format!("branch ratio {ratio} outside (0, 1)"));
                    }
                    for child in children.iter() {
                        walk(child, false, seen)?;
                    }
                    Ok(())
                }
            }
        }
        walk(&self.root, true, &mut HashSet::default())
    }
}

/// Moves `window` between trees. Removal, including any collapse, completes
/// before insertion starts.
pub fn move_window(
    from: &mut LayoutTree,
    to: &mut LayoutTree,
    window: WindowHandle,
    options: InsertOptions,
) -> bool {
    let removed = from.remove_window(window);
    let inserted = to.insert_window(window, None, options);
    removed || inserted
}
