#![forbid(unsafe_code)]

//! `score-queue`: command-line host for the score submission queue.
//!
//! Loads configuration, opens the file-backed queue, and either enqueues a
//! score, reports the pending entries, runs a single flush pass, or keeps
//! the background flush worker running until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use score_queue::models::submission::ScoreSubmission;
use score_queue::persistence::FileStore;
use score_queue::queue::worker::{FlushWorker, FlushWorkerHandle};
use score_queue::transport::HttpTransport;
use score_queue::{AppError, FlushOutcome, GlobalConfig, QueueOptions, Result, ScoreQueue};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "score-queue", about = "Durable score submission queue", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate and enqueue a score, then attempt delivery once.
    Submit {
        /// Player display name.
        #[arg(long)]
        name: String,
        /// Optional contact address.
        #[arg(long)]
        email: Option<String>,
        /// Final game score.
        #[arg(long, allow_negative_numbers = true)]
        score: i64,
    },
    /// Print the pending entries as JSON.
    Status,
    /// Run a single flush pass over the pending entries.
    Flush,
    /// Keep flushing in the background until interrupted.
    Run,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = GlobalConfig::load_from_path(&args.config)?;
    info!(endpoint = %config.endpoint, "configuration loaded");

    let storage = Arc::new(FileStore::new(&config.storage_dir)?);
    let transport = Arc::new(HttpTransport::new(&config.endpoint)?);

    // The one-shot commands drive the pass themselves so they can wait for
    // it before the process exits.
    let options = if matches!(args.command, Command::Run) {
        config.queue_options()
    } else {
        QueueOptions {
            flush_on_add: false,
            ..config.queue_options()
        }
    };
    let queue = ScoreQueue::open(storage, transport, options);

    match args.command {
        Command::Submit { name, email, score } => {
            let submission = ScoreSubmission::new(&name, email.as_deref(), score)?;
            let id = queue.add_score(submission.name, submission.email, submission.score);
            println!("queued {id}");
            print_outcome(queue.flush().await, queue.pending_count());
            Ok(())
        }
        Command::Status => {
            let status = serde_json::to_string_pretty(&queue.status())?;
            println!("{status}");
            Ok(())
        }
        Command::Flush => {
            print_outcome(queue.flush().await, queue.pending_count());
            Ok(())
        }
        Command::Run => serve(queue, &config).await,
    }
}

async fn serve(queue: Arc<ScoreQueue>, config: &GlobalConfig) -> Result<()> {
    let ct = CancellationToken::new();
    let worker = FlushWorker::new(Arc::clone(&queue), config.flush_interval(), ct.clone()).spawn();
    info!(
        interval_secs = config.flush_interval_seconds,
        pending = queue.pending_count(),
        "flush worker started"
    );

    shutdown_signal(&worker).await;
    info!("shutdown signal received");
    ct.cancel();
    worker.shutdown().await;

    info!(pending = queue.pending_count(), "score-queue shut down");
    Ok(())
}

fn print_outcome(outcome: FlushOutcome, pending: usize) {
    match outcome {
        FlushOutcome::Skipped => println!("nothing flushed; {pending} pending"),
        FlushOutcome::Completed(report) => println!(
            "attempted {}, delivered {}, failed {}; {pending} pending",
            report.attempted, report.delivered, report.failed
        ),
    }
}

/// Wait for Ctrl-C or SIGTERM. `SIGUSR1` is forwarded to the worker as a
/// connectivity-restored signal.
#[cfg(unix)]
async fn shutdown_signal(worker: &FlushWorkerHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigusr1) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::user_defined1()),
    ) {
        (Ok(term), Ok(usr1)) => (term, usr1),
        (Err(err), _) | (_, Err(err)) => {
            warn!(%err, "failed to register unix signal handlers, using ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return,
            _ = sigterm.recv() => return,
            _ = sigusr1.recv() => {
                info!("SIGUSR1 received, treating as connectivity restored");
                worker.connectivity_restored();
            }
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal(_worker: &FlushWorkerHandle) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "ctrl-c signal handler failed");
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
