use giftdraw_client::{FeedEvent, FeedSink, Subscription};
use giftdraw_types::{SessionId, SessionParameters};
use tokio::sync::mpsc;
use tracing::warn;

/// Messages sent to a session actor.
pub enum Message {
    Connect {
        broadcaster: String,
    },
    Disconnect,
    UpdateParameters {
        parameters: SessionParameters,
    },
    /// Outcome of the connect attempt started under `generation`.
    Connected {
        generation: u64,
        result: giftdraw_client::Result<Subscription>,
    },
    /// Event from the feed opened under `generation`.
    Feed {
        generation: u64,
        event: FeedEvent,
    },
    Shutdown,
}

/// Mailbox for a session actor.
#[derive(Clone)]
pub struct Mailbox {
    session: SessionId,
    sender: mpsc::Sender<Message>,
}

impl Mailbox {
    pub(super) fn new(session: SessionId, sender: mpsc::Sender<Message>) -> Self {
        Self { session, sender }
    }

    async fn send(&self, message: Message, what: &'static str) {
        if self.sender.send(message).await.is_err() {
            warn!(session = %self.session, "session mailbox closed; {what} dropped");
        }
    }

    pub async fn connect(&self, broadcaster: String) {
        self.send(Message::Connect { broadcaster }, "connect").await;
    }

    pub async fn disconnect(&self) {
        self.send(Message::Disconnect, "disconnect").await;
    }

    pub async fn update_parameters(&self, parameters: SessionParameters) {
        self.send(Message::UpdateParameters { parameters }, "parameter update")
            .await;
    }

    pub(super) async fn connected(
        &self,
        generation: u64,
        result: giftdraw_client::Result<Subscription>,
    ) {
        self.send(Message::Connected { generation, result }, "connect result")
            .await;
    }

    pub(super) async fn shutdown(&self) {
        self.send(Message::Shutdown, "shutdown").await;
    }
}

/// Routes a subscription's events into the session's mailbox, tagged with
/// the generation of the connect that opened it.
pub(super) struct SessionSink {
    mailbox: Mailbox,
    generation: u64,
}

impl SessionSink {
    pub(super) fn new(mailbox: Mailbox, generation: u64) -> Self {
        Self {
            mailbox,
            generation,
        }
    }
}

impl FeedSink for SessionSink {
    async fn deliver(&self, event: FeedEvent) -> bool {
        let message = Message::Feed {
            generation: self.generation,
            event,
        };
        self.mailbox.sender.send(message).await.is_ok()
    }
}
