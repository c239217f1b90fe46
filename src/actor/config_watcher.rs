use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::controller::{self, Event as ControllerEvent};
use crate::common::config::Config;
use crate::sys::executor::Executor;

/// Re-reads the config file whenever it changes on disk and hands the new
/// config to the controller.
pub struct ConfigWatcher {
    file: PathBuf,
    events_tx: controller::Sender,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, events_tx: controller::Sender) -> Self { Self { file, events_tx } }

    pub fn spawn(self) -> std::io::Result<()> {
        let executor = Executor::new()?;
        thread::Builder::new().name("config-watcher".to_string()).spawn(move || {
            executor.run(async move {
                if let Err(e) = self.run().await {
                    warn!("config-watcher: error: {e:?}");
                }
            });
        })?;
        Ok(())
    }

    async fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_compare_contents(true),
        )?;

        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        loop {
            match rx.recv().await {
                Some(Ok(event)) => {
                    if self.is_relevant(&event) {
                        debug!("change detected: {:?}", event.kind);
                        self.reload();
                    } else {
                        debug!("ignoring unrelated event: {:?}", event.kind);
                    }
                }
                Some(Err(e)) => {
                    warn!("watch error: {e:?}");
                }
                None => {
                    warn!("channel closed, exiting");
                    break;
                }
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    /// Reads the file and forwards it. A file that fails to parse leaves the
    /// running config in place.
    fn reload(&self) -> bool {
        let mut config = match Config::read(&self.file) {
            Ok(config) => config,
            Err(e) => {
                warn!("config reload failed, keeping current config: {e:#}");
                return false;
            }
        };
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        let fixes = config.auto_fix_values();
        if fixes > 0 {
            info!(fixes, "applied config fixes");
        }
        info!("config reloaded");
        self.events_tx.send(ControllerEvent::ConfigUpdated(config));
        true
    }
}
