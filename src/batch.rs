//! Size-or-timeout batch assembly on top of the line queue.

use crate::queue::LineQueue;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Resumption marker returned with every batch.
///
/// Tailing always starts at the live end of the file, so there is no
/// position worth handing back to the caller.
pub const RESUME_MARKER: &str = "tailing";

/// One tailed line with its synthetic record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// `<path>.<millis>.<index>`, unique within one process run.
    pub id: String,
    /// Field under which `line` is stored in the record body.
    pub field_name: String,
    pub line: String,
}

impl LineRecord {
    /// The record body: a single field holding the line.
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.field_name.clone(), Value::String(self.line.clone()));
        Value::Object(body)
    }
}

/// The result of one [`BatchAssembler::assemble_batch`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub records: Vec<LineRecord>,
    pub resume_marker: String,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The raw lines in batch order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.line.as_str())
    }
}

/// Drains the line queue into batches on the caller's task.
#[derive(Debug)]
pub struct BatchAssembler {
    queue: Arc<LineQueue>,
    source: String,
    field_name: String,
    wait_interval: Duration,
    last_stamp: AtomicU64,
}

impl BatchAssembler {
    /// `source` prefixes every record id; `wait_interval` is how often the
    /// queue is checked while a batch fills up.
    pub fn new(
        queue: Arc<LineQueue>,
        source: impl Into<String>,
        field_name: impl Into<String>,
        wait_interval: Duration,
    ) -> Self {
        Self {
            queue,
            source: source.into(),
            field_name: field_name.into(),
            wait_interval,
            last_stamp: AtomicU64::new(0),
        }
    }

    /// Returns up to `min(requested_size, max_batch_size)` lines.
    ///
    /// Waits, checking the queue every `wait_interval`, until that many lines
    /// are queued or `max_wait` has elapsed, then drains what is there. A
    /// short or empty batch is a normal result. Dropping the future while it
    /// waits takes nothing from the queue.
    pub async fn assemble_batch(
        &self,
        requested_size: usize,
        max_batch_size: usize,
        max_wait: Duration,
    ) -> Batch {
        let start = Instant::now();
        let fetch = requested_size.min(max_batch_size);
        let stamp = self.next_stamp();

        while self.queue.len() < fetch {
            let elapsed = start.elapsed();
            if elapsed >= max_wait {
                break;
            }
            tokio::time::sleep(self.wait_interval.min(max_wait - elapsed)).await;
        }

        let records = self
            .queue
            .drain(fetch)
            .into_iter()
            .enumerate()
            .map(|(index, line)| LineRecord {
                id: format!("{}.{}.{}", self.source, stamp, index),
                field_name: self.field_name.clone(),
                line,
            })
            .collect();

        Batch {
            records,
            resume_marker: RESUME_MARKER.to_string(),
        }
    }

    /// Wall-clock milliseconds, bumped past the previous call's stamp so ids
    /// from two calls in the same millisecond stay distinct.
    fn next_stamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}
