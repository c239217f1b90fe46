use std::path::PathBuf;

use anyhow::Context;
use autotiling_wm::actor;
use autotiling_wm::actor::config_watcher::ConfigWatcher;
use autotiling_wm::actor::controller::TilingController;
use autotiling_wm::common::config::{Config, config_file};
use autotiling_wm::common::log;
use autotiling_wm::sys::scenario::Scenario;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
struct Cli {
    /// Config file to use instead of the one in the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the config file, print any issues and exit.
    #[arg(long)]
    validate: bool,

    /// Replay a scripted session (RON) and print every placement batch as a
    /// JSON line, followed by the final layout trees.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// After the replay, keep running and re-emit placements whenever the
    /// config file changes.
    #[arg(long, requires = "scenario")]
    watch: bool,
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();

    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.unwrap_or_else(config_file);
    let mut config = Config::read_or_default(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    if opt.validate {
        let issues = config.validate();
        if issues.is_empty() {
            println!("{}: ok", config_path.display());
            return Ok(());
        }
        for issue in &issues {
            println!("{}: {issue}", config_path.display());
        }
        std::process::exit(1);
    }

    for issue in config.validate() {
        warn!("config: {issue}");
    }
    config.auto_fix_values();

    let Some(scenario_path) = opt.scenario else {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    };
    let scenario = Scenario::read(&scenario_path)
        .with_context(|| format!("reading {}", scenario_path.display()))?;

    let replay = scenario.replay(config.clone());
    for batch in &replay.batches {
        println!("{}", serde_json::to_string(batch)?);
    }
    if let Some(registry) = replay.controller.registry() {
        for (index, entry) in registry.entries().iter().enumerate() {
            println!("workspace {index} ({:?}):\n{}", entry.id, entry.tree.draw_tree());
        }
    }

    if !opt.watch {
        return Ok(());
    }

    let (placements_tx, mut placements_rx) = actor::channel();
    let events_tx = TilingController::spawn(config, Box::new(replay.host), placements_tx)?;
    ConfigWatcher::new(config_path, events_tx).spawn()?;
    info!("watching for config changes");
    while let Some((_, batch)) = placements_rx.blocking_recv() {
        println!("{}", serde_json::to_string(&batch)?);
    }
    Ok(())
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of leaving actor threads running headless.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
