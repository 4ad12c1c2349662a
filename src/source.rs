//! The caller-facing tail log source.

use crate::batch::{Batch, BatchAssembler};
use crate::config::TailConfig;
use crate::error::{Error, Result};
use crate::queue::LineQueue;
use crate::tailer::TailSession;
use futures::Stream;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Tails one log file and hands its new lines out in batches.
///
/// `init` starts the background tailer, `produce` is called on the caller's
/// schedule, and `destroy` (or dropping the source) stops tailing.
#[derive(Debug)]
pub struct TailLogSource {
    config: TailConfig,
    session: TailSession,
    assembler: BatchAssembler,
}

impl TailLogSource {
    /// Validates `config`, checks the log file can be read and starts tailing.
    ///
    /// A log file that does not exist yet is fine; tailing picks it up once
    /// it is created. A file that exists but cannot be read is an error.
    pub async fn init(config: TailConfig) -> Result<Self> {
        config.validate()?;
        check_readable(&config.log_file).await?;

        let queue = Arc::new(LineQueue::new(config.max_lines_prefetch));
        let assembler = BatchAssembler::new(
            Arc::clone(&queue),
            config.log_file.display().to_string(),
            config.log_line_record_field_name.clone(),
            config.batch_wait_interval(),
        );
        let session = TailSession::start(&config, queue).await?;

        Ok(Self {
            config,
            session,
            assembler,
        })
    }

    /// Assembles one batch of at most `min(batchSize, max_batch_size)` lines,
    /// waiting no longer than `maxWaitTime`.
    pub async fn produce(&self, max_batch_size: usize) -> Batch {
        self.assembler
            .assemble_batch(self.config.batch_size, max_batch_size, self.config.max_wait())
            .await
    }

    /// Successive non-empty batches from repeated [`produce`](Self::produce) calls.
    ///
    /// Ends once the source is stopped and every queued line has been handed out.
    pub fn batches(&self, max_batch_size: usize) -> impl Stream<Item = Batch> + '_ {
        futures::stream::unfold(self, move |source| async move {
            loop {
                let batch = source.produce(max_batch_size).await;
                if !batch.is_empty() {
                    return Some((batch, source));
                }
                let queue = source.session.queue();
                if queue.is_closed() && queue.is_empty() {
                    return None;
                }
                // A zero wait budget returns without ever awaiting.
                tokio::time::sleep(source.config.batch_wait_interval()).await;
            }
        })
    }

    /// Stops tailing. Lines already queued can still be produced.
    pub fn stop(&self) {
        self.session.stop();
    }

    /// Stops tailing and waits for the background task to exit.
    pub async fn destroy(self) {
        info!(path = %self.config.log_file.display(), "Destroying tail log source");
        self.session.shutdown().await;
    }

    pub fn config(&self) -> &TailConfig {
        &self.config
    }

    pub fn session(&self) -> &TailSession {
        &self.session
    }

    pub fn assembler(&self) -> &BatchAssembler {
        &self.assembler
    }
}

async fn check_readable(path: &Path) -> Result<()> {
    match tokio::fs::File::open(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(Error::PermissionDenied {
            path: path.display().to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
