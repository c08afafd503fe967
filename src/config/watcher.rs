//! Configuration file watcher for hot reload.
//!
//! The watch is registered on the directory containing `config.yml` so that
//! editors which replace the file (write-to-temp then rename) keep
//! triggering events. Events for other files, including the generated side
//! files, are dropped before they reach the supervisor loop.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// What the watcher reports to the supervisor loop.
#[derive(Debug)]
pub enum ConfigEvent {
    /// The configuration file was written, created or replaced.
    Changed,
    /// The watch subsystem reported an error.
    Error(notify::Error),
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    event_tx: mpsc::UnboundedSender<ConfigEvent>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ConfigEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                event_tx,
            },
            event_rx,
        )
    }

    /// Start watching. Events are delivered from notify's background thread.
    ///
    /// The returned watcher must be kept alive for as long as events are
    /// wanted; dropping it stops the watch and closes the channel.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.event_tx.clone();
        let file_name = self.path.file_name().map(OsString::from);
        let dir = watch_dir(&self.path);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_config_change(&event, file_name.as_deref()) {
                        tracing::debug!(kind = ?event.kind, "Config file change detected");
                        let _ = tx.send(ConfigEvent::Changed);
                    }
                }
                Err(e) => {
                    let _ = tx.send(ConfigEvent::Error(e));
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` is a content change of the file named `file_name`.
fn is_config_change(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    let relevant_kind = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };

    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some() && p.file_name() == file_name)
}
