use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use cardio_core::models::VitalReading;
use cardio_vitals::{
    ingest::spawn_persistence_worker, HistoryStore, LatestCache, LiveFeed, TelemetryFrame,
    VitalsIngestor,
};

fn reading(patient: &str, hr: i64) -> VitalReading {
    VitalReading {
        patient: patient.to_string(),
        ts: Utc::now(),
        hr: Some(hr),
        spo2: Some(98),
        sbp: Some(120),
        dbp: Some(80),
        rr: Some(16),
        mode: Some("auto".to_string()),
        source: Some("sim".to_string()),
    }
}

fn frame(patient: &str, reading: &VitalReading) -> TelemetryFrame {
    TelemetryFrame {
        topic: format!("cardio/vitals/{patient}"),
        payload: serde_json::to_vec(reading).unwrap(),
    }
}

struct Harness {
    cache: Arc<LatestCache>,
    feed: LiveFeed,
    ingestor: Arc<VitalsIngestor>,
    persist_rx: mpsc::Receiver<VitalReading>,
}

fn harness() -> Harness {
    let cache = Arc::new(LatestCache::new());
    let feed = LiveFeed::new(Arc::clone(&cache));
    let (persist_tx, persist_rx) = mpsc::channel(64);
    let ingestor = Arc::new(VitalsIngestor::new(
        Arc::clone(&cache),
        feed.publisher(),
        persist_tx,
    ));
    Harness {
        cache,
        feed,
        ingestor,
        persist_rx,
    }
}

// ── Frame consumption ────────────────────────────────────────────────

#[tokio::test]
async fn valid_frame_reaches_cache_feed_and_persist_queue() {
    let mut h = harness();
    let mut sub = h.feed.subscribe();
    let (frame_tx, frame_rx) = mpsc::channel(16);

    let run = tokio::spawn(Arc::clone(&h.ingestor).run(frame_rx));
    frame_tx.send(frame("p1", &reading("p1", 72))).await.unwrap();
    drop(frame_tx);
    run.await.unwrap();

    assert_eq!(h.cache.get("p1").unwrap().hr, Some(72));
    assert_eq!(sub.try_recv().unwrap().hr, Some(72));
    assert_eq!(h.persist_rx.try_recv().unwrap().patient, "p1");
}

#[tokio::test]
async fn unparseable_and_invalid_frames_are_dropped_silently() {
    let mut h = harness();
    let (frame_tx, frame_rx) = mpsc::channel(16);

    let run = tokio::spawn(Arc::clone(&h.ingestor).run(frame_rx));
    frame_tx
        .send(TelemetryFrame {
            topic: "cardio/vitals/p1".to_string(),
            payload: b"not json".to_vec(),
        })
        .await
        .unwrap();
    // hr out of bound
    frame_tx.send(frame("p2", &reading("p2", 250))).await.unwrap();
    // a valid frame after the bad ones still lands
    frame_tx.send(frame("p3", &reading("p3", 64))).await.unwrap();
    drop(frame_tx);
    run.await.unwrap();

    assert!(h.cache.get("p1").is_none());
    assert!(h.cache.get("p2").is_none());
    assert_eq!(h.cache.get("p3").unwrap().hr, Some(64));
    assert_eq!(h.persist_rx.try_recv().unwrap().patient, "p3");
    assert!(h.persist_rx.try_recv().is_err());
}

#[tokio::test]
async fn direct_admit_surfaces_validation_error() {
    let h = harness();
    let err = h.ingestor.admit(reading("p1", 300)).unwrap_err();
    assert!(err.to_string().contains("hr"));
    assert!(h.cache.get("p1").is_none());
}

// ── Persistence worker ───────────────────────────────────────────────

#[tokio::test]
async fn persistence_worker_drains_queue_into_history() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let (tx, rx) = mpsc::channel(16);
    let worker = spawn_persistence_worker(Arc::clone(&history), rx);

    tx.send(reading("p1", 70)).await.unwrap();
    tx.send(reading("p1", 71)).await.unwrap();
    tx.send(reading("p2", 80)).await.unwrap();
    drop(tx);
    worker.await.unwrap();

    assert_eq!(history.count().unwrap(), 3);
    let p1 = history.query("p1", None, None, None).unwrap();
    assert_eq!(p1.len(), 2);
    assert_eq!(p1[0].reading.hr, Some(71));
}

#[tokio::test]
async fn rejected_reading_never_reaches_history() {
    let history = Arc::new(HistoryStore::open_in_memory().unwrap());
    let (persist_tx, persist_rx) = mpsc::channel(16);
    let cache = Arc::new(LatestCache::new());
    let feed = LiveFeed::new(Arc::clone(&cache));
    let ingestor = VitalsIngestor::new(Arc::clone(&cache), feed.publisher(), persist_tx);
    let worker = spawn_persistence_worker(Arc::clone(&history), persist_rx);

    assert!(ingestor.admit(reading("p1", 250)).is_err());
    ingestor.admit(reading("p1", 72)).unwrap();
    drop(ingestor);
    worker.await.unwrap();

    assert_eq!(history.count().unwrap(), 1);
    assert_eq!(cache.get("p1").unwrap().hr, Some(72));
}
