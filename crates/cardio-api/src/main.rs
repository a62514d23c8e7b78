use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardio_api::{router, AppState};
use cardio_core::CardioConfig;
use cardio_model::{Explainer, ModelGateway};
use cardio_vitals::ingest::spawn_persistence_worker;
use cardio_vitals::{HistoryStore, LatestCache, LiveFeed, VitalsIngestor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(CardioConfig::load().context("loading configuration")?);

    // Service stays up without a model; /ml endpoints answer 503 until an
    // artifact is loaded (startup warn-and-continue, reload fixes it).
    let gateway = Arc::new(ModelGateway::new());
    if let Err(e) = gateway.load(Path::new(&config.model.artifact_path)) {
        warn!(path = %config.model.artifact_path, error = %e, "could not load model at startup");
    }
    let explainer = Arc::new(Explainer::new(Arc::clone(&gateway)));

    if let Some(dir) = Path::new(&config.storage.db_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).context("creating storage directory")?;
        }
    }
    let history = Arc::new(
        HistoryStore::open(Path::new(&config.storage.db_path)).context("opening history store")?,
    );

    let cache = Arc::new(LatestCache::new());
    let feed = Arc::new(LiveFeed::new(Arc::clone(&cache)));

    let (persist_tx, persist_rx) = mpsc::channel(config.telemetry.persist_queue_capacity);
    spawn_persistence_worker(Arc::clone(&history), persist_rx);

    let ingestor = Arc::new(VitalsIngestor::new(
        Arc::clone(&cache),
        feed.publisher(),
        persist_tx,
    ));

    let (frame_tx, frame_rx) = mpsc::channel(config.telemetry.frame_queue_capacity);
    tokio::spawn(Arc::clone(&ingestor).run(frame_rx));

    if config.telemetry.simulate {
        cardio_api::sim::spawn(
            frame_tx.clone(),
            config.telemetry.topic_prefix.clone(),
            "P001".to_string(),
            config.telemetry.simulate_interval_ms,
        );
    }

    let state = AppState {
        gateway,
        explainer,
        cache,
        history,
        ingestor,
        feed,
        config: Arc::clone(&config),
    };

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "cardio-server listening");
    axum::serve(listener, router(state))
        .await
        .context("serving")?;
    Ok(())
}
