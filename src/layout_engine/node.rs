use serde::{Deserialize, Serialize};

use crate::layout_engine::TilingMode;
use crate::sys::host::WindowHandle;

/// Child indices from the root down to a node. Empty for the root itself.
pub type NodePath = Vec<usize>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutNode {
    /// Windows sharing one region. The front of `windows` is the visible one.
    Leaf {
        windows: Vec<WindowHandle>,
        mode: TilingMode,
    },
    /// Two regions. `ratio` is the fraction of space given to the first child.
    Branch {
        children: Box<[LayoutNode; 2]>,
        ratio: f32,
    },
}

impl Default for LayoutNode {
    fn default() -> Self { LayoutNode::empty_leaf(TilingMode::default()) }
}

impl LayoutNode {
    pub fn empty_leaf(mode: TilingMode) -> Self { LayoutNode::Leaf { windows: Vec::new(), mode } }

    pub fn leaf(window: WindowHandle, mode: TilingMode) -> Self {
        LayoutNode::Leaf { windows: vec![window], mode }
    }

    pub fn branch(first: LayoutNode, second: LayoutNode, ratio: f32) -> Self {
        LayoutNode::Branch {
            children: Box::new([first, second]),
            ratio,
        }
    }

    pub fn is_leaf(&self) -> bool { matches!(self, LayoutNode::Leaf { .. }) }

    pub fn is_empty_leaf(&self) -> bool {
        matches!(self, LayoutNode::Leaf { windows, .. } if windows.is_empty())
    }

    pub fn window_count(&self) -> usize {
        match self {
            LayoutNode::Leaf { windows, .. } => windows.len(),
            LayoutNode::Branch { children, .. } => children.iter().map(|c| c.window_count()).sum(),
        }
    }

    pub fn collect_windows(&self, out: &mut Vec<WindowHandle>) {
        match self {
            LayoutNode::Leaf { windows, .. } => out.extend(windows.iter().copied()),
            LayoutNode::Branch { children, .. } => {
                for child in children.iter() {
                    child.collect_windows(out);
                }
            }
        }
    }

    pub fn contains(&self, window: WindowHandle) -> bool { self.path_to_window(window).is_some() }

    /// Path to the leaf holding `window`.
    pub fn path_to_window(&self, window: WindowHandle) -> Option<NodePath> {
        fn walk(node: &LayoutNode, window: WindowHandle, path: &mut NodePath) -> bool {
            match node {
                LayoutNode::Leaf { windows, .. } => windows.contains(&window),
                LayoutNode::Branch { children, .. } => {
                    for (idx, child) in children.iter().enumerate() {
                        path.push(idx);
                        if walk(child, window, path) {
                            return true;
                        }
                        path.pop();
                    }
                    false
                }
            }
        }
        let mut path = NodePath::new();
        walk(self, window, &mut path).then_some(path)
    }

    /// Path to the leaf reached by always descending into the first child.
    pub fn first_leaf_path(&self) -> NodePath {
        let mut path = NodePath::new();
        let mut node = self;
        while let LayoutNode::Branch { children, .. } = node {
            path.push(0);
            node = &children[0];
        }
        path
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&LayoutNode> {
        let mut node = self;
        for &idx in path {
            match node {
                LayoutNode::Branch { children, .. } => node = children.get(idx)?,
                LayoutNode::Leaf { .. } => return None,
            }
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut LayoutNode> {
        let mut node = self;
        for &idx in path {
            match node {
                LayoutNode::Branch { children, .. } => node = children.get_mut(idx)?,
                LayoutNode::Leaf { .. } => return None,
            }
        }
        Some(node)
    }

    /// First window found in a depth-first walk, used to pick a neighbour
    /// after the tree changes shape.
    pub fn first_window(&self) -> Option<WindowHandle> {
        match self {
            LayoutNode::Leaf { windows, .. } => windows.first().copied(),
            LayoutNode::Branch { children, .. } => {
                children.iter().find_map(|child| child.first_window())
            }
        }
    }

    /// Replaces every branch that has an empty-leaf child with its other
    /// child, bottom-up. Returns true if anything collapsed.
    pub fn collapse_empty(&mut self) -> bool {
        let LayoutNode::Branch { children, .. } = self else {
            return false;
        };
        let mut collapsed = children[0].collapse_empty();
        collapsed |= children[1].collapse_empty();

        let survivor = match (children[0].is_empty_leaf(), children[1].is_empty_leaf()) {
            (false, false) => return collapsed,
            (true, _) => 1,
            (false, true) => 0,
        };
        let replacement = std::mem::take(&mut children[survivor]);
        *self = replacement;
        true
    }

    pub fn for_each_ratio_mut(&mut self, f: &mut impl FnMut(&mut f32)) {
        if let LayoutNode::Branch { children, ratio } = self {
            f(ratio);
            for child in children.iter_mut() {
                child.for_each_ratio_mut(f);
            }
        }
    }

    pub(crate) fn to_ascii(&self) -> ascii_tree::Tree {
        match self {
            LayoutNode::Leaf { windows, mode } => {
                let names: Vec<String> = windows.iter().map(|w| w.to_string()).collect();
                ascii_tree::Tree::Leaf(vec![format!("leaf({mode}) [{}]", names.join(", "))])
            }
            LayoutNode::Branch { children, ratio } => ascii_tree::Tree::Node(
                format!("branch {ratio:.2}"),
                children.iter().map(|c| c.to_ascii()).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn w(raw: u64) -> WindowHandle { WindowHandle::new(raw) }

    fn leaf(raw: u64) -> LayoutNode { LayoutNode::leaf(w(raw), TilingMode::Stack) }

    #[test]
    fn paths_follow_child_indices() {
        let tree = LayoutNode::branch(leaf(1), LayoutNode::branch(leaf(2), leaf(3), 0.5), 0.5);
        assert_eq!(tree.path_to_window(w(1)), Some(vec![0]));
        assert_eq!(tree.path_to_window(w(3)), Some(vec![1, 1]));
        assert_eq!(tree.path_to_window(w(4)), None);
        assert_eq!(tree.first_leaf_path(), vec![0]);
        assert_eq!(tree.node_at(&[1, 0]), Some(&leaf(2)));
        assert_eq!(tree.node_at(&[0, 0]), None);
    }

    #[test]
    fn collapse_empty_propagates_upwards() {
        let mut tree = LayoutNode::branch(
            leaf(1),
            LayoutNode::branch(
                LayoutNode::empty_leaf(TilingMode::Stack),
                LayoutNode::empty_leaf(TilingMode::Stack),
                0.3,
            ),
            0.7,
        );
        assert!(tree.collapse_empty());
        assert_eq!(tree, leaf(1));
    }

    #[test]
    fn collapse_keeps_sibling_subtree_intact() {
        let sibling = LayoutNode::branch(leaf(2), leaf(3), 0.25);
        let mut tree =
            LayoutNode::branch(LayoutNode::empty_leaf(TilingMode::Tab), sibling.clone(), 0.6);
        assert!(tree.collapse_empty());
        assert_eq!(tree, sibling);
        assert!(!tree.collapse_empty());
    }

    #[test]
    fn collects_windows_in_tree_order() {
        let tree = LayoutNode::branch(
            LayoutNode::Leaf { windows: vec![w(4), w(1)], mode: TilingMode::Tab },
            leaf(2),
            0.5,
        );
        let mut out = Vec::new();
        tree.collect_windows(&mut out);
        assert_eq!(out, vec![w(4), w(1), w(2)]);
        assert_eq!(tree.window_count(), 3);
        assert_eq!(tree.first_window(), Some(w(4)));
    }
}
