//! Per-workspace layout trees and the geometry they resolve to.

pub mod command;
pub mod error;
mod graph;
pub mod node;
pub mod resolve;
pub mod tree;
pub mod utils;
pub mod workspaces;

pub use command::LayoutCommand;
pub use error::LayoutError;
pub use graph::{InsertAction, InsertionPolicy, Orientation, TilingMode};
pub use node::{LayoutNode, NodePath};
pub use resolve::resolve;
pub use tree::{InsertHint, InsertOptions, LayoutTree, move_window};
pub use workspaces::{WorkspaceChange, WorkspaceEntry, WorkspaceRegistry};
