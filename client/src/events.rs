use giftdraw_types::{ConnectState, GiftNotification};
use std::future::Future;
use tokio::sync::mpsc;

/// Something that happened on a live feed after the room was joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    Gift(GiftNotification),
    /// The broadcast ended. Nothing is delivered after this.
    StreamEnd,
    /// The connection to the feed was lost. Nothing is delivered after this.
    Dropped,
}

/// Destination for a subscription's events.
///
/// Events are delivered one at a time, in the order the feed produced them,
/// and each delivery completes before the next begins.
pub trait FeedSink: Send + Sync + 'static {
    /// Deliver one event. Returns `false` once nobody is listening, after
    /// which the subscription stops reading.
    fn deliver(&self, event: FeedEvent) -> impl Future<Output = bool> + Send;
}

impl FeedSink for mpsc::Sender<FeedEvent> {
    async fn deliver(&self, event: FeedEvent) -> bool {
        self.send(event).await.is_ok()
    }
}

/// An established feed for one broadcaster's room.
///
/// Events go to the [`FeedSink`] given at connect time. Dropping the
/// subscription stops the task delivering them.
pub struct Subscription {
    state: ConnectState,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Subscription {
    /// A subscription whose events are produced by `handle`.
    pub fn with_task(state: ConnectState, handle: tokio::task::JoinHandle<()>) -> Self {
        Self {
            state,
            handle: Some(handle),
        }
    }

    /// State reported by the feed when the room was joined.
    pub fn state(&self) -> &ConnectState {
        &self.state
    }
}
