//! Background task that follows a log file and fills the line queue.

use crate::config::TailConfig;
use crate::error::{Error, Result};
use crate::queue::LineQueue;
use crate::reader::{AppendedLines, ReadOutcome, TailCursor, open_appended};
use crate::watcher::{FileWatcher, next_change};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

/// One running tail of a log file.
///
/// Lines appended after [`TailSession::start`] returns are pushed onto the
/// shared [`LineQueue`] in file order. Stopping closes the queue for further
/// pushes; lines already queued stay drainable.
#[derive(Debug)]
pub struct TailSession {
    file_path: PathBuf,
    poll_interval: Duration,
    queue: Arc<LineQueue>,
    shutdown_tx: broadcast::Sender<()>,
    task_handle: Option<JoinHandle<()>>,
}

impl TailSession {
    /// Positions at the current end of the file and spawns the tailer task.
    pub async fn start(config: &TailConfig, queue: Arc<LineQueue>) -> Result<Self> {
        let file_path = config.log_file.clone();
        let poll_interval = config.poll_interval();
        let cursor = TailCursor::at_end_of(&file_path).await?;

        let watcher = if config.watch_events {
            match FileWatcher::watch(&file_path) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "File events unavailable, polling only");
                    None
                }
            }
        } else {
            None
        };

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let span = info_span!("tail_log", instance = %config.instance_name, path = %file_path.display());

        let task = TailTask {
            file_path: file_path.clone(),
            poll_interval,
            cursor,
            watcher,
            queue: Arc::clone(&queue),
        };
        let task_handle = tokio::spawn(task.run(shutdown_rx).instrument(span));

        info!(
            path = %file_path.display(),
            offset = cursor.position(),
            capacity = queue.capacity(),
            "Started tailing log file"
        );

        Ok(Self {
            file_path,
            poll_interval,
            queue,
            shutdown_tx,
            task_handle: Some(task_handle),
        })
    }

    /// Signals the tailer to stop. No line is queued after this returns.
    ///
    /// Safe to call repeatedly and after the task has already exited.
    pub fn stop(&self) {
        if !self.queue.is_closed() {
            debug!(path = %self.file_path.display(), "Stopping tail session");
        }
        self.queue.close();
        let _ = self.shutdown_tx.send(());
    }

    /// Stops the session and waits for the tailer task to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                warn!(path = %self.file_path.display(), error = %e, "Tailer task ended abnormally");
            }
        }
    }

    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn queue(&self) -> &Arc<LineQueue> {
        &self.queue
    }
}

impl Drop for TailSession {
    fn drop(&mut self) {
        self.stop();
    }
}

struct TailTask {
    file_path: PathBuf,
    poll_interval: Duration,
    cursor: TailCursor,
    watcher: Option<FileWatcher>,
    queue: Arc<LineQueue>,
}

impl TailTask {
    async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut reported_missing = false;

        loop {
            tokio::select! {
                // A closed sender means the session was dropped.
                _ = shutdown_rx.recv() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = next_change(&mut self.watcher) => {}
            }

            match open_appended(&self.file_path, &mut self.cursor).await {
                Ok(ReadOutcome::Missing) => {
                    if !reported_missing {
                        warn!(path = %self.file_path.display(), "Log file does not exist");
                        reported_missing = true;
                    }
                }
                Ok(ReadOutcome::Appended(mut appended)) => {
                    if reported_missing {
                        info!(path = %self.file_path.display(), "Log file appeared");
                        reported_missing = false;
                    }
                    match self.forward_lines(&mut appended).await {
                        Ok(0) => {}
                        Ok(count) => {
                            debug!(count, offset = self.cursor.position(), "Queued appended lines")
                        }
                        Err(Error::QueueClosed) => {
                            debug!("Line queue closed, discarding remaining lines");
                            return;
                        }
                        Err(e) => {
                            warn!(path = %self.file_path.display(), error = %e, "Error while trying to read log file");
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %self.file_path.display(), error = %e, "Error while trying to read log file");
                }
            }
        }

        debug!("Tailer task stopped");
    }

    /// Moves appended lines onto the queue one at a time.
    async fn forward_lines(&mut self, appended: &mut AppendedLines) -> Result<usize> {
        let mut count = 0;
        while let Some(line) = appended.next_line(&mut self.cursor).await? {
            // Waits here while the queue is full; fails once the session stops.
            self.queue.push(line).await?;
            count += 1;
        }
        Ok(count)
    }
}
