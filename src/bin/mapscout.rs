//! mapscout service binary
//!
//! Usage:
//!   cargo run --release --bin mapscout
//!
//! Environment variables: see `mapscout::config`.

use dotenv::dotenv;
use log::{error, info, warn};
use mapscout::aggregate::SpeciesNames;
use mapscout::config::{ScoutConfig, SinkBackend};
use mapscout::ingress;
use mapscout::queue::ScanContext;
use mapscout::sink::{HttpSink, JsonlSink, MapSink};
use mapscout::source::HttpMapSource;
use mapscout::worker::{Worker, WorkerPool};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    init_logging();

    let config = ScoutConfig::from_env()?;

    info!("🚀 Starting mapscout");
    info!("   ├─ Listen: {}", config.listen_addr);
    info!("   ├─ Source: {}", config.source_url);
    info!("   ├─ Accounts: {}", config.accounts.len());
    info!("   ├─ Sink: {:?}", config.sink_backend);
    info!(
        "   └─ Walk: step {} / wild limit {} / static limit {} / throttle {}ms",
        config.walk.step_size,
        config.walk.wild_step_limit,
        config.walk.static_step_limit,
        config.walk.throttle.as_millis()
    );

    let species = match SpeciesNames::load(&config.species_path) {
        Ok(names) => names,
        Err(e) => {
            warn!(
                "⚠️  Could not load species names from {}: {} (using numeric names)",
                config.species_path.display(),
                e
            );
            SpeciesNames::default()
        }
    };
    let species = Arc::new(species);

    let sink: Arc<dyn MapSink> = match config.sink_backend {
        SinkBackend::Http => Arc::new(HttpSink::new(&config.sink_endpoint, config.sink_bearer.clone())?),
        SinkBackend::Jsonl => Arc::new(JsonlSink::new(
            &config.sink_output_path,
            config.sink_max_size_mb,
            config.sink_max_rotations,
        )?),
    };
    info!("📤 Delivering items via {} backend", sink.backend_type());

    let context = Arc::new(ScanContext::new(config.queue_depth_file.clone()));
    context.publish_depth();

    let source = Arc::new(HttpMapSource::new(&config.source_url)?);

    let workers = config
        .accounts
        .iter()
        .cloned()
        .map(|credential| {
            Worker::new(
                credential,
                Arc::clone(&source),
                Arc::clone(&context),
                Arc::clone(&sink),
                Arc::clone(&species),
                config.walk.clone(),
            )
        })
        .collect();
    let pool = WorkerPool::spawn(workers);
    info!("✅ {} workers running", pool.size());

    tokio::select! {
        result = ingress::serve(config.listen_addr, Arc::clone(&context)) => {
            if let Err(e) = &result {
                error!("❌ Ingress stopped: {}", e);
            }
            result?;
        }
        _ = pool.join() => {
            error!("❌ Worker pool stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutting down");
        }
    }

    Ok(())
}

/// Logger first, so configuration fallbacks are visible
fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // HTTP client internals are noisy at debug; keep them at warn unless asked for
    for module in ["reqwest", "hyper", "hyper_util"] {
        if !log_level.contains(module) {
            builder.filter_module(module, log::LevelFilter::Warn);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}
