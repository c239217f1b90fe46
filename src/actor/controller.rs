//! The tiling controller reacts to host events, keeps the workspace trees in
//! sync with them, and emits window placements.
//!
//! All mutation and resolution happens on the controller's own thread, one
//! event at a time, so geometry is always computed against a settled tree.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::common::config::{Config, LayoutSettings};
use crate::layout_engine::{LayoutCommand, LayoutError, WorkspaceChange, WorkspaceRegistry, resolve};
use crate::sys::executor::Executor;
use crate::sys::geometry::Rect;
use crate::sys::host::{HostState, WindowHandle, WindowInfo, WorkspaceId};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// The host now has this many workspaces.
    WorkspaceCountChanged(usize),
    WindowAdded {
        workspace: usize,
        window: WindowInfo,
    },
    WindowRemoved {
        workspace: usize,
        window: WindowInfo,
    },
    /// `window.workspace` already names the new workspace.
    WindowMoved {
        window: WindowInfo,
        from: usize,
        to: usize,
    },
    WindowFocused {
        workspace: usize,
        window: WindowHandle,
    },
    /// The usable area of a workspace changed (e.g. a panel appeared).
    WorkAreaChanged(usize),
    ConfigUpdated(Config),
    SetTilingEnabled(bool),
    Command(LayoutCommand),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub window: WindowHandle,
    pub frame: Rect,
}

/// Frames for every tiled window of one workspace.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlacementBatch {
    pub workspace: usize,
    pub workspace_id: WorkspaceId,
    pub placements: Vec<Placement>,
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub struct TilingController {
    config: Config,
    host: Box<dyn HostState + Send>,
    /// Present exactly while tiling is enabled.
    registry: Option<WorkspaceRegistry>,
    placements_tx: actor::Sender<PlacementBatch>,
}

impl TilingController {
    /// Starts the controller on its own thread and returns the sender that
    /// feeds it events.
    pub fn spawn(
        config: Config,
        host: Box<dyn HostState + Send>,
        placements_tx: actor::Sender<PlacementBatch>,
    ) -> std::io::Result<Sender> {
        let (events_tx, events) = actor::channel();
        let executor = Executor::new()?;
        thread::Builder::new().name("tiling-controller".to_string()).spawn(move || {
            let controller = TilingController::new(config, host, placements_tx);
            executor.run(controller.run(events));
        })?;
        Ok(events_tx)
    }

    /// Creates the controller. If tiling is on, every workspace is adopted
    /// from the host and laid out immediately.
    pub fn new(
        config: Config,
        host: Box<dyn HostState + Send>,
        placements_tx: actor::Sender<PlacementBatch>,
    ) -> Self {
        let mut controller = TilingController {
            config,
            host,
            registry: None,
            placements_tx,
        };
        if controller.config.settings.tiling_on {
            controller.enable();
        }
        controller
    }

    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
        debug!("Event channel closed; controller exiting");
    }

    pub fn is_enabled(&self) -> bool { self.registry.is_some() }

    pub fn config(&self) -> &Config { &self.config }

    pub fn registry(&self) -> Option<&WorkspaceRegistry> { self.registry.as_ref() }

    fn log_event(&self, event: &Event) {
        match event {
            Event::WindowFocused { .. } => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "controller::handle_event", skip(self, event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        match event {
            Event::ConfigUpdated(config) => self.on_config_updated(config),
            Event::SetTilingEnabled(on) => {
                self.config.settings.tiling_on = on;
                self.apply_enabled();
            }
            event => {
                let Some(registry) = self.registry.as_mut() else {
                    trace!("Tiling disabled; ignoring event");
                    return;
                };
                let settings = &self.config.settings.layout;
                match Self::apply(registry, &*self.host, settings, event) {
                    Ok(dirty) => {
                        for workspace in dirty {
                            self.relayout(workspace);
                        }
                    }
                    Err(err) => warn!(%err, "Layout event not applied"),
                }
            }
        }
    }

    /// Mutates the registry for one host event and returns the workspaces
    /// whose placements changed.
    fn apply(
        registry: &mut WorkspaceRegistry,
        host: &dyn HostState,
        settings: &LayoutSettings,
        event: Event,
    ) -> Result<Vec<usize>, LayoutError> {
        let dirty = match event {
            Event::WorkspaceCountChanged(count) => {
                match registry.on_workspace_count_changed(count, host, settings)? {
                    WorkspaceChange::Added(range) => range.collect(),
                    WorkspaceChange::Removed { .. } | WorkspaceChange::Unchanged => vec![],
                }
            }
            Event::WindowAdded { workspace, window } => registry
                .on_window_added(workspace, &window, settings)?
                .then_some(workspace)
                .into_iter()
                .collect(),
            Event::WindowRemoved { workspace, window } => registry
                .on_window_removed(workspace, &window)?
                .then_some(workspace)
                .into_iter()
                .collect(),
            Event::WindowMoved { window, from, to } => {
                if registry.on_window_moved(&window, from, to, settings)? {
                    vec![from, to]
                } else {
                    vec![]
                }
            }
            Event::WindowFocused { workspace, window } => {
                registry.on_window_focused(workspace, window)?;
                vec![]
            }
            Event::WorkAreaChanged(workspace) => {
                if workspace >= registry.len() {
                    return Err(LayoutError::UnknownWorkspace(workspace));
                }
                vec![workspace]
            }
            Event::Command(command) => registry.handle_command(command)?.into_iter().collect(),
            Event::ConfigUpdated(_) | Event::SetTilingEnabled(_) => vec![],
        };
        Ok(dirty)
    }

    fn on_config_updated(&mut self, config: Config) {
        let old = std::mem::replace(&mut self.config, config);
        if old.settings.tiling_on != self.config.settings.tiling_on {
            self.apply_enabled();
        } else if old.settings.layout.gaps != self.config.settings.layout.gaps {
            debug!(gaps = ?self.config.settings.layout.gaps, "Gaps changed");
            self.relayout_all();
        }
    }

    fn apply_enabled(&mut self) {
        match (self.config.settings.tiling_on, self.is_enabled()) {
            (true, false) => self.enable(),
            (false, true) => {
                info!("Tiling disabled");
                self.registry = None;
            }
            _ => {}
        }
    }

    fn enable(&mut self) {
        let mut registry = WorkspaceRegistry::new();
        let count = self.host.workspace_count();
        if let Err(err) =
            registry.on_workspace_count_changed(count, &*self.host, &self.config.settings.layout)
        {
            warn!(%err, "Could not adopt host workspaces");
        }
        info!(workspaces = registry.len(), "Tiling enabled");
        self.registry = Some(registry);
        self.relayout_all();
    }

    fn relayout_all(&self) {
        let count = self.registry.as_ref().map_or(0, |r| r.len());
        for workspace in 0..count {
            self.relayout(workspace);
        }
    }

    fn relayout(&self, workspace: usize) {
        let Some(registry) = &self.registry else {
            return;
        };
        let (Some(workspace_id), Some(tree)) = (registry.identity(workspace), registry.tree(workspace))
        else {
            return;
        };
        let Some(screen) = self.host.work_area(workspace) else {
            debug!(workspace, "Host reports no work area; skipping layout");
            return;
        };
        let placements = resolve(tree, screen, &self.config.settings.layout.gaps)
            .into_iter()
            .map(|(window, frame)| Placement { window, frame })
            .collect::<Vec<_>>();
        trace!(workspace, count = placements.len(), "Emitting placements");
        self.placements_tx.send(PlacementBatch {
            workspace,
            workspace_id,
            placements,
        });
    }
}
