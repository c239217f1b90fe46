//! Scripted host sessions, replayed through a [`SimulatedHost`] and a
//! controller. Scenarios are written in RON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::actor;
use crate::actor::controller::{Event, PlacementBatch, TilingController};
use crate::common::config::{Config, GapSettings};
use crate::layout_engine::LayoutCommand;
use crate::sys::geometry::Rect;
use crate::sys::host::{WindowHandle, WindowKind};
use crate::sys::simulated::{SharedHost, SimulatedHost};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AddWorkspace,
    RemoveWorkspace(usize),
    OpenWindow {
        window: WindowHandle,
        workspace: usize,
        #[serde(default)]
        kind: WindowKind,
        #[serde(default)]
        on_all_workspaces: bool,
    },
    CloseWindow(WindowHandle),
    MoveWindow {
        window: WindowHandle,
        to: usize,
    },
    FocusWindow(WindowHandle),
    SetWorkArea {
        workspace: usize,
        area: Rect,
    },
    SetGaps(GapSettings),
    SetTiling(bool),
    Command(LayoutCommand),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Workspaces present before the first step.
    #[serde(default = "one")]
    pub workspaces: usize,
    pub steps: Vec<Step>,
}

fn one() -> usize { 1 }

/// The outcome of a replay: the host and controller in their final state and
/// every batch emitted along the way.
pub struct Replay {
    pub host: SharedHost,
    pub controller: TilingController,
    pub batches: Vec<PlacementBatch>,
}

impl Scenario {
    pub fn read(path: &Path) -> anyhow::Result<Scenario> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Scenario> { Ok(ron::from_str(buf)?) }

    pub fn replay(&self, config: Config) -> Replay {
        let host = SimulatedHost::new(self.workspaces).shared();
        let (placements_tx, mut placements_rx) = actor::channel();
        let mut controller = TilingController::new(config, Box::new(host.clone()), placements_tx);

        for (index, step) in self.steps.iter().enumerate() {
            let _span = info_span!("step", index).entered();
            debug!(?step, "Replaying");
            let events = Self::host_events(&host, &controller, step);
            for event in events {
                controller.handle_event(event);
            }
        }

        let mut batches = Vec::new();
        while let Ok((_, batch)) = placements_rx.try_recv() {
            batches.push(batch);
        }
        Replay { host, controller, batches }
    }

    fn host_events(host: &SharedHost, controller: &TilingController, step: &Step) -> Vec<Event> {
        let mut host = host.write();
        match step {
            Step::AddWorkspace => host.add_workspace(),
            Step::RemoveWorkspace(index) => host.remove_workspace(*index),
            Step::OpenWindow {
                window,
                workspace,
                kind,
                on_all_workspaces,
            } => host.open_window(*window, *workspace, *kind, *on_all_workspaces),
            Step::CloseWindow(window) => host.close_window(*window),
            Step::MoveWindow { window, to } => host.move_window(*window, *to),
            Step::FocusWindow(window) => host.focus_window(*window),
            Step::SetWorkArea { workspace, area } => host.set_work_area(*workspace, *area),
            Step::SetGaps(gaps) => {
                let mut config = controller.config().clone();
                config.settings.layout.gaps = *gaps;
                vec![Event::ConfigUpdated(config)]
            }
            Step::SetTiling(on) => vec![Event::SetTilingEnabled(*on)],
            Step::Command(command) => vec![Event::Command(command.clone())],
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::{LayoutNode, TilingMode};

    const SESSION: &str = r#"
        (
            workspaces: 2,
            steps: [
                set_gaps((inner: 5, outer: 10)),
                open_window(window: 1, workspace: 0),
                open_window(window: 2, workspace: 0),
                open_window(window: 3, workspace: 0, kind: dialog),
                open_window(window: 4, workspace: 1, on_all_workspaces: true),
                command(resize_window(window: 1, amount: 0.25)),
                close_window(2),
                add_workspace,
                move_window(window: 1, to: 2),
            ],
        )
    "#;

    fn w(raw: u64) -> WindowHandle { WindowHandle::new(raw) }

    #[test]
    fn parses_and_replays_a_session() {
        let scenario = Scenario::parse(SESSION).unwrap();
        assert_eq!(scenario.workspaces, 2);
        assert_eq!(scenario.steps.len(), 9);

        let replay = scenario.replay(Config::default());
        let registry = replay.controller.registry().unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.tree(0).unwrap().is_empty());
        assert!(registry.tree(1).unwrap().is_empty());
        assert_eq!(registry.tree(2).unwrap().root(), &LayoutNode::leaf(w(1), TilingMode::Stack));

        let last = replay.batches.last().unwrap();
        assert_eq!(last.workspace, 2);
        assert_eq!(last.placements[0].frame, Rect::from_xywh(10.0, 10.0, 1900.0, 1060.0));
    }

    #[test]
    fn toggling_tiling_mid_session() {
        let scenario = Scenario::parse(
            "(steps: [set_tiling(false), open_window(window: 1, workspace: 0), set_tiling(true)])",
        )
        .unwrap();
        let replay = scenario.replay(Config::default());
        // Startup layout, then the rebuild on re-enable.
        assert_eq!(replay.batches.len(), 2);
        assert_eq!(replay.batches[1].placements.len(), 1);
    }

    #[test]
    fn unknown_scenario_fields_are_rejected() {
        assert!(Scenario::parse("(steps: [], screens: 2)").is_err());
    }
}
