//! A log tailing source that hands out newly appended lines in batches.
//!
//! A background task follows a single log file from its current end, pushing
//! every complete appended line onto a bounded queue. Callers pull batches
//! from that queue on their own schedule: each call waits until enough lines
//! are queued or its wait budget runs out, then returns what is there.
//!
//! # Example
//!
//! ```rust,no_run
//! use tail_log_source::{TailConfig, TailLogSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = TailLogSource::init(TailConfig::new("app.log")).await?;
//!
//!     loop {
//!         let batch = source.produce(1000).await;
//!         for record in &batch.records {
//!             println!("{} {}", record.id, record.line);
//!         }
//!     }
//! }
//! ```

mod batch;
mod config;
mod error;
mod queue;
mod reader;
mod source;
mod tailer;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use batch::{Batch, BatchAssembler, LineRecord, RESUME_MARKER};
pub use config::TailConfig;
pub use error::{Error, Result};
pub use queue::LineQueue;
pub use source::TailLogSource;
pub use tailer::TailSession;
