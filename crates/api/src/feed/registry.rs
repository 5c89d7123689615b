use std::collections::HashMap;

use photobooth_core::feed::FeedEvent;
use photobooth_core::types::DbId;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};

/// Events buffered per project before slow subscribers start lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// A live subscription to one project's feed.
///
/// Hand it back to [`FeedRegistry::unsubscribe`] when the consumer goes
/// away so an idle project's channel is torn down.
pub struct FeedSubscription {
    project_id: DbId,
    receiver: broadcast::Receiver<FeedEvent>,
}

impl FeedSubscription {
    pub fn project_id(&self) -> DbId {
        self.project_id
    }

    /// Wait for the next event. `Lagged` means events were dropped for this
    /// subscriber; `Closed` means the registry shut the channel down.
    pub async fn recv(&mut self) -> Result<FeedEvent, RecvError> {
        self.receiver.recv().await
    }
}

/// Per-project fan-out of [`FeedEvent`]s.
///
/// A project's channel exists only while it has subscribers: it is created
/// by the first [`subscribe`](Self::subscribe) and removed by the last
/// [`unsubscribe`](Self::unsubscribe). Publishing to a project nobody
/// watches is a no-op.
pub struct FeedRegistry {
    channels: RwLock<HashMap<DbId, broadcast::Sender<FeedEvent>>>,
    capacity: usize,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a project's feed, creating its channel if needed.
    pub async fn subscribe(&self, project_id: DbId) -> FeedSubscription {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        FeedSubscription {
            project_id,
            receiver: sender.subscribe(),
        }
    }

    /// End a subscription. Removes the project's channel once nobody is
    /// listening.
    pub async fn unsubscribe(&self, subscription: FeedSubscription) {
        let project_id = subscription.project_id;
        let mut channels = self.channels.write().await;
        drop(subscription);

        if channels
            .get(&project_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&project_id);
            tracing::debug!(project_id, "Feed channel closed");
        }
    }

    /// Deliver `event` to the project's current subscribers.
    ///
    /// Returns how many subscribers received it.
    pub async fn publish(&self, project_id: DbId, event: FeedEvent) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&project_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Number of projects with at least one open channel.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Current subscribers of one project.
    pub async fn subscriber_count(&self, project_id: DbId) -> usize {
        self.channels
            .read()
            .await
            .get(&project_id)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Drop every channel so subscribers observe `Closed`.
    pub async fn shutdown_all(&self) {
        let mut channels = self.channels.write().await;
        let count = channels.len();
        channels.clear();
        tracing::info!(count, "Closed all feed channels");
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
