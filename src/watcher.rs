//! File-system change notifications using the notify crate.
//!
//! Events only wake the tailer early. The tailer still polls on its own
//! interval, so a missed or unsupported event never loses lines.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

/// Watches the directory containing the tailed file.
pub(crate) struct FileWatcher {
    _watcher: RecommendedWatcher,
    // Holds at most one pending wake-up.
    receiver: mpsc::Receiver<()>,
}

impl FileWatcher {
    /// Starts watching the parent directory of `path`.
    ///
    /// The directory is watched rather than the file so that creation of a
    /// not-yet-existing file is noticed too.
    pub(crate) fn watch<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let (tx, rx) = mpsc::channel(1);

        let mut watcher = RecommendedWatcher::new(wake_on_change(tx, file_name), Config::default())?;
        watcher.watch(&watch_dir(file_path), RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Waits until the watched file has changed since the last call.
    ///
    /// Never resolves once the underlying watcher has shut down.
    pub(crate) async fn changed(&mut self) {
        if self.receiver.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

/// Event handler that turns relevant events into a single pending wake-up.
///
/// Further events while a wake-up is pending are dropped, so a stalled
/// tailer never accumulates them.
fn wake_on_change(
    tx: mpsc::Sender<()>,
    file_name: String,
) -> impl FnMut(notify::Result<Event>) + Send + 'static {
    move |res| match res {
        Ok(event) if is_event_relevant_to_file(&event, &file_name) => {
            let _ = tx.try_send(());
        }
        Ok(_) => {}
        Err(e) => debug!(error = %e, "Ignoring file watcher error"),
    }
}

/// Waits for a change on `watcher`, or forever when there is none.
pub(crate) async fn next_change(watcher: &mut Option<FileWatcher>) {
    match watcher {
        Some(watcher) => watcher.changed().await,
        None => std::future::pending::<()>().await,
    }
}

fn watch_dir(file_path: &Path) -> PathBuf {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}
