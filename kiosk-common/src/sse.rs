//! Server-Sent Events (SSE) utilities
//!
//! Converts the EventBus broadcast into an SSE response body.

use crate::events::KioskEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Interval between keep-alive comments on idle streams
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Create an SSE stream that forwards every event from `rx`
///
/// The SSE event name is the event variant; the data is the JSON form.
/// Lagged receivers skip the dropped events and keep streaming.
pub fn create_event_sse_stream(
    rx: broadcast::Receiver<KioskEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("Broadcasting SSE event: {}", event.event_type());
                    Some(Ok(Event::default().event(event.event_type()).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}
