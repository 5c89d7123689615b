use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use photobooth_core::error::CoreError;
use photobooth_db::repositories::ProjectRepo;
use tokio::sync::broadcast::error::RecvError;

use crate::error::{AppError, AppResult};
use crate::feed::{FeedRegistry, FeedSubscription};
use crate::state::AppState;

/// Interval between keep-alive pings on an idle feed socket.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// GET /api/v1/projects/{slug}/feed
///
/// Upgrades to a WebSocket that streams the project's feed events as JSON
/// text frames. Unknown projects are rejected before the upgrade.
pub async fn feed_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Project",
                key: slug.clone(),
            })
        })?;

    let feed = Arc::clone(&state.feed);
    Ok(ws.on_upgrade(move |socket| async move {
        let subscription = feed.subscribe(project.id).await;
        handle_socket(socket, &feed, subscription).await;
    }))
}

/// Pump feed events into one socket until either side goes away, then
/// release the subscription.
async fn handle_socket(socket: WebSocket, feed: &FeedRegistry, mut subscription: FeedSubscription) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let project_id = subscription.project_id();
    tracing::info!(conn_id = %conn_id, project_id, "Feed socket connected");

    let (mut sink, mut stream) = socket.split();
    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await;

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let outbound = match event {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode feed event");
                            continue;
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(conn_id = %conn_id, skipped, "Feed subscriber lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                };
                if sink.send(outbound).await.is_err() {
                    tracing::debug!(conn_id = %conn_id, "Feed socket sink closed");
                    break;
                }
            }
            _ = ping.tick() => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => match inbound {
                None | Some(Ok(Message::Close(_))) => break,
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Feed socket receive error");
                    break;
                }
                // The feed is one-way; inbound frames are ignored.
                Some(Ok(_)) => {}
            },
        }
    }

    feed.unsubscribe(subscription).await;
    tracing::info!(conn_id = %conn_id, project_id, "Feed socket disconnected");
}
