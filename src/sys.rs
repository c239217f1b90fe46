//! The boundary between the tiling core and the desktop it runs in.

pub mod executor;
pub mod geometry;
pub mod host;
pub mod scenario;
pub mod simulated;
