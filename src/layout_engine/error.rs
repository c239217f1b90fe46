use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "workspace count went from {old} to {new} but no workspace identity mismatch was found"
    )]
    InconsistentWorkspaceState { old: usize, new: usize },
    #[error("host has no identity for workspace at index {0}")]
    MissingWorkspaceIdentity(usize),
    #[error("no workspace at index {0}")]
    UnknownWorkspace(usize),
}
