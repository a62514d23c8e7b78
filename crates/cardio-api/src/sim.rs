//! In-process vitals simulator for demos.
//!
//! Emits one plausible reading per interval on the telemetry channel,
//! exactly as an external publisher would. Values oscillate inside normal
//! clinical ranges; deterministic on purpose so demo dashboards are
//! reproducible.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use cardio_core::models::VitalReading;
use cardio_vitals::TelemetryFrame;

pub fn spawn(
    frames: mpsc::Sender<TelemetryFrame>,
    topic_prefix: String,
    patient: String,
    interval_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(patient = %patient, interval_ms, "vitals simulator running");
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
        let mut tick: u64 = 0;
        loop {
            ticker.tick().await;
            let reading = synth_reading(&patient, tick);
            let frame = TelemetryFrame {
                topic: format!("{topic_prefix}/{patient}"),
                payload: match serde_json::to_vec(&reading) {
                    Ok(p) => p,
                    Err(_) => continue,
                },
            };
            if frames.send(frame).await.is_err() {
                info!("telemetry channel closed, simulator stopping");
                return;
            }
            tick += 1;
        }
    })
}

fn synth_reading(patient: &str, tick: u64) -> VitalReading {
    let phase = (tick as f64 * 0.7).sin();
    let wobble = |mid: f64, span: f64| (mid + span * phase).round() as i64;
    VitalReading {
        patient: patient.to_string(),
        ts: Utc::now(),
        hr: Some(wobble(80.0, 8.0)),
        spo2: Some(wobble(97.0, 2.0)),
        sbp: Some(wobble(122.0, 7.0)),
        dbp: Some(wobble(80.0, 5.0)),
        rr: Some(wobble(15.0, 3.0)),
        mode: Some("normal".to_string()),
        source: Some("sim".to_string()),
    }
}
