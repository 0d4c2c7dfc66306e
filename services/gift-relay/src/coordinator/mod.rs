//! Session lifecycle coordination.
//!
//! A session is `Idle` once registered, `Connecting` while a feed connect is
//! outstanding, `Live` while gifts flow, and `Closed` after an explicit
//! disconnect, a failed connect, or a dropped feed. Every transition into
//! `Closed` pushes a disconnect notice to the session's listeners. A closed
//! session may reconnect for as long as it stays registered.

use crate::store::{ParameterStore, StoreError};
use giftdraw_client::LiveFeed;
use giftdraw_types::{SessionEvent, SessionId, SessionParameters};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

mod actor;
use actor::Actor;
mod ingress;
pub use ingress::Mailbox;


/// Lifecycle state of one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Live,
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("no session {0}")]
    UnknownSession(SessionId),
    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),
}

impl From<StoreError> for CoordinatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(id) => Self::AlreadyRegistered(id),
            StoreError::UnknownSession(id) => Self::UnknownSession(id),
        }
    }
}

/// Configuration for the coordinator.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of requests queued per session before callers wait.
    pub mailbox_size: usize,

    /// Number of session events buffered per listener before it lags.
    pub event_capacity: usize,

    /// Base seed for session RNGs. Session `n` (counting registrations from
    /// zero) draws from `seed + n`. Sessions draw from OS entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mailbox_size: 256,
            event_capacity: 1024,
            seed: None,
        }
    }
}

struct SessionHandle {
    mailbox: Mailbox,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

/// Binds sessions to live feeds and to the reward pipeline.
pub struct Coordinator<F: LiveFeed> {
    feed: Arc<F>,
    store: Arc<ParameterStore>,
    config: Config,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
    registrations: AtomicU64,
}

impl<F: LiveFeed> Coordinator<F> {
    pub fn new(feed: F, config: Config) -> Self {
        Self {
            feed: Arc::new(feed),
            store: Arc::new(ParameterStore::new()),
            config,
            sessions: Mutex::new(HashMap::new()),
            registrations: AtomicU64::new(0),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mailbox(&self, id: &SessionId) -> Result<Mailbox, CoordinatorError> {
        self.sessions()
            .get(id)
            .map(|handle| handle.mailbox.clone())
            .ok_or_else(|| CoordinatorError::UnknownSession(id.clone()))
    }

    fn rng(&self) -> StdRng {
        let n = self.registrations.fetch_add(1, Ordering::Relaxed);
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }

    /// Start a session with default parameters. The returned receiver sees
    /// every event the session pushes from now on.
    pub fn register(
        &self,
        id: SessionId,
    ) -> Result<broadcast::Receiver<SessionEvent>, CoordinatorError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(&id) {
            return Err(CoordinatorError::AlreadyRegistered(id));
        }
        self.store.create(&id)?;

        let (sender, receiver) = mpsc::channel(self.config.mailbox_size.max(1));
        let mailbox = Mailbox::new(id.clone(), sender);
        let (events, listener) = broadcast::channel(self.config.event_capacity.max(1));
        let (state, state_receiver) = watch::channel(SessionState::Idle);
        let task = Actor::new(
            id.clone(),
            self.feed.clone(),
            self.store.clone(),
            mailbox.clone(),
            receiver,
            events.clone(),
            state,
            self.rng(),
        )
        .start();

        info!(session = %id, "session registered");
        sessions.insert(
            id,
            SessionHandle {
                mailbox,
                events,
                state: state_receiver,
                task,
            },
        );
        Ok(listener)
    }

    /// Connect the session to `broadcaster`'s live feed, replacing any feed
    /// that is active or pending.
    pub async fn connect(&self, id: &SessionId, broadcaster: String) -> Result<(), CoordinatorError> {
        self.mailbox(id)?.connect(broadcaster).await;
        Ok(())
    }

    pub async fn disconnect(&self, id: &SessionId) -> Result<(), CoordinatorError> {
        self.mailbox(id)?.disconnect().await;
        Ok(())
    }

    /// Replace the session's reward parameters. The update is queued behind
    /// the gifts the session has already received, which still draw against
    /// the previous parameters.
    pub async fn update_parameters(
        &self,
        id: &SessionId,
        parameters: SessionParameters,
    ) -> Result<(), CoordinatorError> {
        self.mailbox(id)?.update_parameters(parameters).await;
        Ok(())
    }

    /// Watch an existing session's events without owning it.
    pub fn subscribe(
        &self,
        id: &SessionId,
    ) -> Result<broadcast::Receiver<SessionEvent>, CoordinatorError> {
        self.sessions()
            .get(id)
            .map(|handle| handle.events.subscribe())
            .ok_or_else(|| CoordinatorError::UnknownSession(id.clone()))
    }

    pub fn state(&self, id: &SessionId) -> Option<SessionState> {
        self.sessions().get(id).map(|handle| *handle.state.borrow())
    }

    pub fn parameters(&self, id: &SessionId) -> Result<Arc<SessionParameters>, CoordinatorError> {
        Ok(self.store.get(id)?)
    }

    /// End a session: release its feed, stop its actor and drop its
    /// parameters. Listeners see their event stream close.
    pub async fn unregister(&self, id: &SessionId) -> Result<(), CoordinatorError> {
        let handle = self
            .sessions()
            .remove(id)
            .ok_or_else(|| CoordinatorError::UnknownSession(id.clone()))?;
        handle.mailbox.shutdown().await;
        if let Err(err) = handle.task.await {
            warn!(session = %id, error = %err, "session actor failed");
        }
        self.store.destroy(id)?;
        info!(session = %id, "session unregistered");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
