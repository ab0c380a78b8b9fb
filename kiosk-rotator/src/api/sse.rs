//! Server-Sent Events (SSE) endpoint
//!
//! Streams every `KioskEvent` from the engine's EventBus.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tracing::debug;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(
        "New SSE client connected ({} subscribers)",
        ctx.events.subscriber_count() + 1
    );
    kiosk_common::sse::create_event_sse_stream(ctx.events.subscribe())
}
