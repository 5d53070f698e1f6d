use std::convert::Infallible;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast::Sender;
use tokio_stream::StreamExt;
use tokio_stream::{Stream, wrappers};

use crate::services::ServiceEvent;

#[derive(Clone)]
pub struct SSEState {
    pub sender: Sender<ServiceEvent>,
}

pub fn sse_router(sse_state: SSEState) -> Router {
    Router::new()
        .route("/api/events", get(sse_handler))
        .with_state(sse_state)
}

pub async fn sse_handler(
    State(state): State<SSEState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.sender.subscribe();

    let stream = wrappers::BroadcastStream::new(receiver).filter_map(|result| {
        let event = result.ok()?;
        match Event::default().json_data(&event) {
            Ok(data) => Some(Ok(data)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode event");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
