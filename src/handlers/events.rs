use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::{unfold, Stream};
use tokio::sync::broadcast;
use tracing::debug;

use crate::handlers::AppState;

/// Server-sent change stream. Clients receive `INVENTORY_UPDATED` and
/// `LOW_STOCK` notifications as they are published; a lagged subscriber skips
/// the missed messages and keeps going.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "SSE stream of change notifications")
    ),
    tag = "events"
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.broadcaster.subscribe();

    let stream = unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let event = match serde_json::to_string(&notification) {
                        Ok(json) => SseEvent::default().event(notification.kind).data(json),
                        Err(e) => {
                            debug!(error = %e, "failed to serialize notification");
                            continue;
                        }
                    };
                    return Some((Ok(event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "sse subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
