use std::future::Future;

use tokio::runtime::{Builder, Runtime};

/// Runs an actor loop on a single-threaded runtime.
///
/// The runtime is built where the executor is created, so a failure surfaces
/// to whoever spawns the actor; `run` then moves it onto the actor's thread.
pub struct Executor {
    runtime: Runtime,
}

impl Executor {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            runtime: Builder::new_current_thread().build()?,
        })
    }

    /// Drives `future` to completion on the calling thread. Tasks never
    /// migrate to another thread.
    pub fn run<F: Future>(self, future: F) -> F::Output { self.runtime.block_on(future) }
}
