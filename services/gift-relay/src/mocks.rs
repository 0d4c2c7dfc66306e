//! Test doubles for the live feed.

use futures_util::{future::BoxFuture, FutureExt};
use giftdraw_client::{Error, FeedEvent, FeedSink, LiveFeed, Subscription};
use giftdraw_types::{ConnectState, GiftNotification, COMBO_GIFT_TYPE};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

type Deliver = Arc<dyn Fn(FeedEvent) -> BoxFuture<'static, bool> + Send + Sync>;

fn erase<S: FeedSink>(sink: S) -> Deliver {
    let sink = Arc::new(sink);
    Arc::new(move |event: FeedEvent| {
        let sink = sink.clone();
        async move { sink.deliver(event).await }.boxed()
    })
}

/// A connect call waiting for the test to decide its outcome.
pub struct PendingConnect {
    pub broadcaster: String,
    deliver: Deliver,
    reply: oneshot::Sender<giftdraw_client::Result<Subscription>>,
}

impl PendingConnect {
    /// Deliver an event before the connect has resolved.
    pub async fn send(&self, event: FeedEvent) -> bool {
        (self.deliver)(event).await
    }

    /// Complete the connect with a live subscription to `room_id`.
    pub fn accept(self, room_id: &str) -> FeedHandle {
        let (guard, released) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        });
        let subscription = Subscription::with_task(ConnectState::connected(room_id), task);
        let _ = self.reply.send(Ok(subscription));
        FeedHandle {
            deliver: self.deliver,
            released,
        }
    }

    pub fn reject(self, message: &str) {
        let _ = self.reply.send(Err(Error::Rejected(message.to_string())));
    }
}

/// The producing end of an accepted subscription.
pub struct FeedHandle {
    deliver: Deliver,
    released: oneshot::Receiver<()>,
}

impl FeedHandle {
    pub async fn send(&self, event: FeedEvent) {
        assert!((self.deliver)(event).await, "session stopped listening");
    }

    /// Wait until the session drops the subscription.
    pub async fn released(&mut self) {
        let _ = timeout(WAIT, &mut self.released)
            .await
            .expect("subscription was not released");
    }
}

/// Feed whose connects are resolved by the test through [`PendingConnect`].
pub struct MockFeed {
    calls: mpsc::UnboundedSender<PendingConnect>,
}

impl MockFeed {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingConnect>) {
        let (calls, receiver) = mpsc::unbounded_channel();
        (Self { calls }, receiver)
    }
}

impl LiveFeed for MockFeed {
    async fn connect<S: FeedSink>(
        &self,
        broadcaster: &str,
        sink: S,
    ) -> giftdraw_client::Result<Subscription> {
        let (reply, response) = oneshot::channel();
        let pending = PendingConnect {
            broadcaster: broadcaster.to_string(),
            deliver: erase(sink),
            reply,
        };
        if self.calls.send(pending).is_err() {
            return Err(Error::ConnectionClosed);
        }
        response.await.unwrap_or(Err(Error::ConnectionClosed))
    }
}

pub async fn next_call(calls: &mut mpsc::UnboundedReceiver<PendingConnect>) -> PendingConnect {
    timeout(WAIT, calls.recv())
        .await
        .expect("timed out waiting for connect")
        .expect("feed dropped")
}

pub fn gift(gift_type: i64, diamond_count: u64, repeat_count: u32, repeat_end: bool) -> GiftNotification {
    GiftNotification {
        gift_id: 5655,
        repeat_count,
        repeat_end,
        user_id: "6813181309701180417".to_string(),
        nickname: "viewer".to_string(),
        gift_type,
        diamond_count,
    }
}

pub fn combo(diamond_count: u64, repeat_count: u32, repeat_end: bool) -> GiftNotification {
    gift(COMBO_GIFT_TYPE, diamond_count, repeat_count, repeat_end)
}
