//! Live feed access for giftdraw.
//!
//! [`LiveFeed`] is the seam between the session coordinator and whatever
//! produces gift notifications for a broadcaster. [`RelayFeed`] implements it
//! against a feed relay speaking the JSON WebSocket protocol described by
//! [`giftdraw_types::FeedFrame`].

pub mod events;
pub mod relay;

pub use events::{FeedEvent, FeedSink, Subscription};
pub use relay::RelayFeed;

use std::future::Future;
use thiserror::Error;

/// Error type for feed operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected ws or wss)")]
    InvalidScheme(String),
    #[error("dial timeout")]
    DialTimeout,
    #[error("feed rejected connection: {0}")]
    Rejected(String),
    #[error("connection closed")]
    ConnectionClosed,
    #[error("unexpected frame before handshake: {0}")]
    UnexpectedFrame(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Source of live gift notifications.
pub trait LiveFeed: Send + Sync + 'static {
    /// Join the room of `broadcaster`. Resolves once the feed has confirmed the
    /// room (or refused it); from then on events are delivered to `sink`,
    /// ending with [`FeedEvent::StreamEnd`] or [`FeedEvent::Dropped`].
    /// Dropping the returned [`Subscription`] releases the feed.
    fn connect<S: FeedSink>(
        &self,
        broadcaster: &str,
        sink: S,
    ) -> impl Future<Output = Result<Subscription>> + Send;
}
