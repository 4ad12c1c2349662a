use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use std::process;
use tail_log_source::{TailConfig, TailLogSource};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Tail a log file and print each new line as a JSON record.
#[derive(Parser, Debug)]
#[command(name = "tail-log-source", version)]
struct Cli {
    /// Log file to tail
    log_file: PathBuf,

    /// Lines held in memory before tailing pauses
    #[arg(long, default_value_t = 100)]
    max_lines_prefetch: usize,

    /// Target number of lines per batch
    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Milliseconds to wait for a batch to fill up
    #[arg(long, default_value_t = 5000)]
    max_wait_time: u64,

    /// Field name for the line in each record
    #[arg(long, default_value = "logLine")]
    field_name: String,

    /// Milliseconds between polls of the log file
    #[arg(long, default_value_t = 1000)]
    poll_interval: u64,

    /// Rely on polling only, ignoring file-system events
    #[arg(long)]
    no_watch: bool,
}

impl Cli {
    fn into_config(self) -> TailConfig {
        TailConfig {
            max_lines_prefetch: self.max_lines_prefetch,
            batch_size: self.batch_size,
            max_wait_time: self.max_wait_time,
            log_line_record_field_name: self.field_name,
            poll_interval: self.poll_interval,
            watch_events: !self.no_watch,
            ..TailConfig::new(self.log_file)
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    let max_batch_size = config.batch_size;

    let source = match TailLogSource::init(config).await {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Error setting up log tailing");
            process::exit(1);
        }
    };

    {
        let mut batches = Box::pin(source.batches(max_batch_size));
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                batch = batches.next() => {
                    let Some(batch) = batch else { break };
                    for record in &batch.records {
                        let mut value = record.to_value();
                        value["id"] = serde_json::Value::String(record.id.clone());
                        println!("{}", value);
                    }
                }
            }
        }
    }

    source.destroy().await;
}
