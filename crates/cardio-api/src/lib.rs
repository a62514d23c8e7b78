//! # cardio-api
//!
//! HTTP and WebSocket surface for the CardioAI risk service: prediction
//! and explanation endpoints under `/ml`, the vitals push/history/live
//! surface under `/iot`.

pub mod error;
pub mod routes;
pub mod sim;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/ml", routes::ml::routes())
        .nest("/iot", routes::vitals::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
