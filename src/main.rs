//! NeuroPath Engine CLI
//!
//! Streaming behavioral inference for attention screening.

use chrono::Utc;
use clap::{Parser, Subcommand};
use neuropath_engine::{
    config::Config,
    records::LongitudinalRecordStore,
    remote::{RemoteClient, RemoteConfig, RemoteError},
    server::{self, ServerConfig, ServerState},
    session::ContinuousInferenceSession,
    source::{ingest_channel, SimulatedSource},
    SCREENING_DISCLAIMER, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuropath")]
#[command(author = "NeuroPath")]
#[command(version = VERSION)]
#[command(about = "Streaming behavioral inference for attention screening", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a screening session against the simulated sample source
    Run {
        /// Session length in seconds (Ctrl+C stops earlier)
        #[arg(long, default_value = "30")]
        duration: u64,

        /// Tick interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Sliding window capacity in samples
        #[arg(long)]
        capacity: Option<usize>,

        /// Minimum samples before scoring starts
        #[arg(long)]
        min_samples: Option<usize>,

        /// Seed for the simulated source
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Remote analysis endpoint (overrides config; omit for local-only)
        #[arg(long)]
        remote_url: Option<String>,

        /// Write the session record store to this path instead of the default
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Serve the HTTP ingest and records API
    Serve {
        /// Port to bind (0 for random)
        #[arg(long, default_value = "7430")]
        port: u16,

        /// Remote analysis endpoint (overrides config; omit for local-only)
        #[arg(long)]
        remote_url: Option<String>,
    },

    /// List stored screening records
    Records,

    /// Display the screening disclaimer
    Disclaimer,

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            duration,
            tick_ms,
            capacity,
            min_samples,
            seed,
            remote_url,
            output,
        } => {
            cmd_run(duration, tick_ms, capacity, min_samples, seed, remote_url, output).await;
        }
        Commands::Serve { port, remote_url } => {
            cmd_serve(port, remote_url).await;
        }
        Commands::Records => {
            cmd_records();
        }
        Commands::Disclaimer => {
            println!("{SCREENING_DISCLAIMER}");
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

async fn cmd_run(
    duration: u64,
    tick_ms: Option<u64>,
    capacity: Option<usize>,
    min_samples: Option<usize>,
    seed: u64,
    remote_url: Option<String>,
    output: Option<PathBuf>,
) {
    println!("NeuroPath Engine v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let mut engine = config.engine.clone();
    if let Some(ms) = tick_ms {
        engine.tick_interval = Duration::from_millis(ms);
    }
    if let Some(c) = capacity {
        engine.capacity = c;
    }
    if let Some(m) = min_samples {
        engine.min_to_score = m;
    }
    if let Err(e) = engine.validate() {
        eprintln!("Error: invalid engine configuration: {e}");
        std::process::exit(1);
    }

    let remote_url = remote_url.or_else(|| config.remote_url.clone());

    println!("Starting screening session...");
    println!("  Tick interval: {}ms", engine.tick_interval.as_millis());
    println!("  Window capacity: {} samples", engine.capacity);
    println!("  Minimum to score: {} samples", engine.min_to_score);
    println!(
        "  Remote analysis: {}",
        remote_url.as_deref().unwrap_or("disabled (local-only)")
    );
    println!();
    println!("Press Ctrl+C to stop early");
    println!();

    let source = Box::new(SimulatedSource::new(seed, engine.tick_interval.as_millis() as u64));
    let mut session = ContinuousInferenceSession::new(engine, source);

    let tick_count = Arc::new(std::sync::atomic::AtomicU64::new(0));
    let ticks = tick_count.clone();
    let started = session.start(move |result| {
        let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if n % 10 == 0 || result.diagnostics.source_fault.is_some() {
            println!(
                "[{}] tick {:>4}: score {:>4.1} (confidence {:.2}) [{}]",
                Utc::now().format("%H:%M:%S"),
                n,
                result.score,
                result.confidence,
                result.behavioral_tags.join(", ")
            );
        }
    });
    if !started {
        eprintln!("Error: session could not start");
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let deadline = std::time::Instant::now() + Duration::from_secs(duration);
    while running.load(Ordering::SeqCst) && std::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!();
    println!("Stopping session...");
    session.stop().await;

    // Remote analysis is one best-effort attempt; any failure falls back to
    // the local summary inside the merge.
    let outcome = match remote_url {
        Some(url) => match RemoteClient::new(RemoteConfig::new(url)) {
            Ok(client) => {
                println!("Requesting remote analysis...");
                client.analyze(session.captured_samples()).await
            }
            Err(e) => Err(e),
        },
        None => Err(RemoteError::Disabled),
    };

    let store_path = output.unwrap_or_else(|| config.data_path.join("records.json"));
    let mut store = match LongitudinalRecordStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Warning: Could not read record store: {e}");
            LongitudinalRecordStore::new()
        }
    };

    match session.finish(outcome, &mut store).await {
        Some((result, record)) => {
            println!();
            println!("Session complete");
            println!("  Score: {:.1} / 10", result.score);
            println!("  Confidence: {:.2}", result.confidence);
            println!("  Tags: {}", result.behavioral_tags.join(", "));
            println!("  Explanation: {}", result.explanation);
            println!("  Samples captured: {}", record.features.len());

            if let Err(e) = store.save(&store_path) {
                eprintln!("Error writing record store: {e}");
            } else {
                println!("  Record saved to {store_path:?} ({} total)", store.len());
            }
        }
        None => {
            println!("No samples captured; nothing to record.");
        }
    }

    session.dispose().await;
}

async fn cmd_serve(port: u16, remote_url: Option<String>) {
    println!("NeuroPath Engine v{VERSION}");
    println!();

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    if let Err(e) = config.engine.validate() {
        eprintln!("Error: invalid engine configuration: {e}");
        std::process::exit(1);
    }

    let remote_url = remote_url.or_else(|| config.remote_url.clone());
    let store_path = config.data_path.join("records.json");
    let store = match LongitudinalRecordStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Warning: Could not read record store: {e}");
            LongitudinalRecordStore::new()
        }
    };

    // Samples POSTed to /ingest flow through this channel into the session.
    let (ingest_tx, ingest_source) = ingest_channel(1024);
    let mut session = ContinuousInferenceSession::new(config.engine.clone(), Box::new(ingest_source));

    if !session.start(|result| {
        tracing::info!(
            score = result.score,
            confidence = result.confidence,
            "inference result"
        );
    }) {
        eprintln!("Error: session could not start");
        std::process::exit(1);
    }

    let state = Arc::new(ServerState::new(ingest_tx, store));
    let (addr, shutdown_tx) = match server::run(ServerConfig::new(port), state.clone()).await {
        Ok(handles) => handles,
        Err(e) => {
            eprintln!("Error starting server: {e}");
            std::process::exit(1);
        }
    };

    println!("Listening on http://{addr}");
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());
    while running.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!();
    println!("Shutting down...");
    let _ = shutdown_tx.send(());
    session.stop().await;

    let outcome = match remote_url {
        Some(url) => match RemoteClient::new(RemoteConfig::new(url)) {
            Ok(client) => client.analyze(session.captured_samples()).await,
            Err(e) => Err(e),
        },
        None => Err(RemoteError::Disabled),
    };

    {
        let mut store = state.store_mut().await;
        if session.finish(outcome, &mut store).await.is_some() {
            if let Err(e) = store.save(&store_path) {
                eprintln!("Error writing record store: {e}");
            } else {
                println!("Record saved to {store_path:?} ({} total)", store.len());
            }
        }
    }

    session.dispose().await;
}

fn cmd_records() {
    let config = Config::load().unwrap_or_default();
    let store_path = config.data_path.join("records.json");

    let store = match LongitudinalRecordStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error reading record store: {e}");
            std::process::exit(1);
        }
    };

    if store.is_empty() {
        println!("No screening records found in {store_path:?}");
        println!("Run 'neuropath run' to record a session.");
        return;
    }

    println!("Screening Records ({} total)", store.len());
    println!("============================");
    println!();
    for record in store.records() {
        println!(
            "{}  score {:>4.1}  {} samples",
            record.date.format("%Y-%m-%d %H:%M:%S"),
            record.risk_score,
            record.features.len()
        );
        for observation in &record.observations {
            println!("    - {observation}");
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
