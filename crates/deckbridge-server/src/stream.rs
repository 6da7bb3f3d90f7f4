use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use deckbridge_core::events::TriggerEvent;
use deckbridge_core::frame::Frame;
use deckbridge_core::ids::SubscriberId;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::server::AppState;
use crate::subscriber::SubscriberRegistry;

/// How long a stream may sit idle before a keep-alive comment is written.
/// Exists only to defeat proxy and browser idle timeouts; it carries no
/// application meaning.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(25);

/// Unregisters the subscriber when the owning stream is dropped.
///
/// Every exit path (client disconnect, write failure, prune during
/// broadcast, server shutdown) ends in this drop, so removal runs exactly
/// once, and `unregister` is idempotent anyway.
struct StreamGuard {
    registry: Arc<SubscriberRegistry>,
    id: SubscriberId,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.registry.unregister(&self.id);
        tracing::debug!(subscriber_id = %self.id, "Stream closed");
    }
}

/// The frame sequence for one subscription: the hello frame, then pending
/// events as data frames, with a keep-alive comment whenever a full wait
/// window passes without traffic. Ends when the channel closes.
pub fn event_frames(
    registry: Arc<SubscriberRegistry>,
    id: SubscriberId,
    mut rx: mpsc::Receiver<TriggerEvent>,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let guard = StreamGuard { registry, id };

    let frames = stream! {
        let _guard = guard;

        if let Ok(text) = Frame::Hello.encode() {
            yield Bytes::from(text);
        }

        loop {
            match timeout(KEEP_ALIVE_INTERVAL, rx.recv()).await {
                Ok(Some(event)) => match Frame::Data(event).encode() {
                    Ok(text) => yield Bytes::from(text),
                    Err(e) => tracing::warn!(error = %e, "Dropping unencodable event"),
                },
                // Channel closed: we were pruned, or the server is gone.
                Ok(None) => break,
                Err(_) => {
                    if let Ok(text) = Frame::KeepAlive.encode() {
                        yield Bytes::from(text);
                    }
                }
            }
        }
    };

    frames.map(Ok::<_, Infallible>)
}

/// Open a subscription: register a channel and stream frames over it for as
/// long as the connection lives. Bytes are handed to the connection as each
/// frame is produced, never buffered into a final body.
pub async fn subscribe(State(state): State<AppState>) -> Response {
    let (id, rx) = state.registry.register();
    tracing::debug!(subscriber_id = %id, subscribers = state.registry.count(), "Stream opened");

    let frames = event_frames(Arc::clone(&state.registry), id, rx);

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(frames));

    match response {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(item: Option<Result<Bytes, Infallible>>) -> String {
        let bytes = item.expect("stream ended early").unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn hello_frame_comes_first() {
        let registry = Arc::new(SubscriberRegistry::new(8));
        let (id, rx) = registry.register();
        let mut frames = Box::pin(event_frames(Arc::clone(&registry), id, rx));

        assert_eq!(text(frames.next().await), ": connected\n\n");
    }

    #[tokio::test]
    async fn events_stream_as_data_frames() {
        let registry = Arc::new(SubscriberRegistry::new(8));
        let (id, rx) = registry.register();
        let tx = registry.snapshot()[0].1.clone();
        let mut frames = Box::pin(event_frames(Arc::clone(&registry), id, rx));

        assert_eq!(text(frames.next().await), ": connected\n\n");

        tx.try_send(TriggerEvent::Animal { idx: 5 }).unwrap();
        assert_eq!(
            text(frames.next().await),
            "data: {\"type\":\"animal\",\"idx\":5}\n\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn keep_alive_emitted_when_idle() {
        let registry = Arc::new(SubscriberRegistry::new(8));
        let (id, rx) = registry.register();
        let mut frames = Box::pin(event_frames(Arc::clone(&registry), id, rx));

        assert_eq!(text(frames.next().await), ": connected\n\n");
        // No traffic: the paused clock jumps the full wait window.
        assert_eq!(text(frames.next().await), ": ping\n\n");
        assert_eq!(text(frames.next().await), ": ping\n\n");
    }

    #[tokio::test]
    async fn stream_ends_when_unregistered() {
        let registry = Arc::new(SubscriberRegistry::new(8));
        let (id, rx) = registry.register();
        let mut frames = Box::pin(event_frames(Arc::clone(&registry), id.clone(), rx));

        assert_eq!(text(frames.next().await), ": connected\n\n");

        registry.unregister(&id);
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_stream_unregisters() {
        let registry = Arc::new(SubscriberRegistry::new(8));
        let (id, rx) = registry.register();
        assert_eq!(registry.count(), 1);

        let mut frames = Box::pin(event_frames(Arc::clone(&registry), id, rx));
        assert_eq!(text(frames.next().await), ": connected\n\n");

        drop(frames);
        assert_eq!(registry.count(), 0);
    }
}
