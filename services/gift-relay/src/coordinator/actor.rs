use super::{
    ingress::{Message, SessionSink},
    Mailbox, SessionState,
};
use crate::store::ParameterStore;
use giftdraw_client::{FeedEvent, LiveFeed, Subscription};
use giftdraw_execution::{admit, reward};
use giftdraw_types::{ConnectState, GiftNotification, SessionEvent, SessionId, SessionParameters};
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Owns one session: its lifecycle state, its feed subscription and its RNG.
///
/// Client requests, connect results and feed events share one queue and are
/// handled one at a time in arrival order, so a gift is drawn against the
/// parameters in force when it was received. Every connect attempt runs in
/// its own task tagged with the generation it was started under; results and
/// events from older generations are dropped, which releases any
/// subscription they carry. Events that overtake their own connect result
/// are held until the session goes live.
pub struct Actor<F: LiveFeed> {
    session: SessionId,
    feed: Arc<F>,
    store: Arc<ParameterStore>,
    mailbox: Mailbox,
    receiver: mpsc::Receiver<Message>,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Sender<SessionState>,
    rng: StdRng,

    generation: u64,
    subscription: Option<Subscription>,
    early: Vec<FeedEvent>,
    pending: Vec<JoinHandle<()>>,
}

impl<F: LiveFeed> Actor<F> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        session: SessionId,
        feed: Arc<F>,
        store: Arc<ParameterStore>,
        mailbox: Mailbox,
        receiver: mpsc::Receiver<Message>,
        events: broadcast::Sender<SessionEvent>,
        state: watch::Sender<SessionState>,
        rng: StdRng,
    ) -> Self {
        Self {
            session,
            feed,
            store,
            mailbox,
            receiver,
            events,
            state,
            rng,
            generation: 0,
            subscription: None,
            early: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            match message {
                Message::Connect { broadcaster } => self.connect(broadcaster),
                Message::Disconnect => self.disconnect(),
                Message::UpdateParameters { parameters } => self.update_parameters(parameters),
                Message::Connected { generation, result } => self.connected(generation, result),
                Message::Feed { generation, event } => self.feed(generation, event),
                Message::Shutdown => break,
            }
        }

        self.subscription = None;
        for handle in self.pending.drain(..) {
            handle.abort();
        }
        debug!(session = %self.session, "session actor stopped");
    }

    fn current(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn push(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!(session = %self.session, "no listeners for session event");
        }
    }

    fn connect(&mut self, broadcaster: String) {
        if matches!(
            self.current(),
            SessionState::Connecting | SessionState::Live
        ) {
            info!(session = %self.session, "replacing active feed");
            self.close();
        }

        self.generation += 1;
        let generation = self.generation;
        self.set_state(SessionState::Connecting);
        info!(session = %self.session, generation, %broadcaster, "connecting to live feed");

        self.pending.retain(|handle| !handle.is_finished());
        let feed = self.feed.clone();
        let mailbox = self.mailbox.clone();
        let sink = SessionSink::new(mailbox.clone(), generation);
        self.pending.push(tokio::spawn(async move {
            let result = feed.connect(&broadcaster, sink).await;
            mailbox.connected(generation, result).await;
        }));
    }

    fn disconnect(&mut self) {
        let room_id = self
            .subscription
            .as_ref()
            .and_then(|subscription| subscription.state().room_id.clone());
        info!(session = %self.session, state = ?self.current(), ?room_id, "disconnect requested");
        self.close();
    }

    fn update_parameters(&self, parameters: SessionParameters) {
        match self.store.update(&self.session, parameters) {
            Ok(()) => info!(session = %self.session, "parameters updated"),
            Err(err) => warn!(session = %self.session, error = %err, "dropping parameter update"),
        }
    }

    fn connected(&mut self, generation: u64, result: giftdraw_client::Result<Subscription>) {
        if generation != self.generation || self.current() != SessionState::Connecting {
            debug!(
                session = %self.session,
                generation,
                current = self.generation,
                "discarding stale connect result"
            );
            return;
        }

        match result {
            Ok(subscription) => {
                let state = subscription.state().clone();
                info!(session = %self.session, generation, room_id = ?state.room_id, "live feed connected");
                self.subscription = Some(subscription);
                self.set_state(SessionState::Live);
                self.push(SessionEvent::connection_state(self.session.clone(), state));

                for event in std::mem::take(&mut self.early) {
                    if self.current() != SessionState::Live {
                        break;
                    }
                    self.feed_event(event);
                }
            }
            Err(err) => {
                warn!(session = %self.session, generation, error = %err, "live feed connect failed");
                self.close();
            }
        }
    }

    fn feed(&mut self, generation: u64, event: FeedEvent) {
        if generation != self.generation {
            debug!(session = %self.session, generation, "discarding stale feed event");
            return;
        }
        if self.current() == SessionState::Connecting {
            self.early.push(event);
        } else {
            self.feed_event(event);
        }
    }

    fn feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Gift(gift) => self.gift(gift),
            FeedEvent::StreamEnd => {
                info!(session = %self.session, generation = self.generation, "live feed ended");
                self.close();
            }
            FeedEvent::Dropped => {
                info!(session = %self.session, generation = self.generation, "live feed dropped");
                self.close();
            }
        }
    }

    fn gift(&mut self, gift: GiftNotification) {
        let Some(admitted) = admit(gift) else {
            return;
        };
        debug!(
            session = %self.session,
            user_id = %admitted.gift.user_id,
            nickname = %admitted.gift.nickname,
            gift_id = admitted.gift.gift_id,
            diamonds = admitted.gift.diamond_count,
            repeat = admitted.gift.repeat_count,
            "gift admitted"
        );

        let parameters = match self.store.get(&self.session) {
            Ok(parameters) => parameters,
            Err(err) => {
                warn!(session = %self.session, error = %err, "dropping gift");
                return;
            }
        };
        let message = reward(&self.session, &admitted, &parameters, &mut self.rng);
        self.push(SessionEvent::RewardComputed(message));
    }

    /// Move to `Closed` (when a feed was active or pending), release the
    /// subscription and push the disconnect notice.
    fn close(&mut self) {
        self.generation += 1;
        self.subscription = None;
        self.early.clear();
        if matches!(
            self.current(),
            SessionState::Connecting | SessionState::Live
        ) {
            self.set_state(SessionState::Closed);
        }
        self.push(SessionEvent::connection_state(
            self.session.clone(),
            ConnectState::disconnected(),
        ));
    }
}
