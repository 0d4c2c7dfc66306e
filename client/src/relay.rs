//! WebSocket client for a live feed relay.
//!
//! The relay serves one WebSocket per broadcaster at `{base}/live/{name}`. Its
//! first frame either confirms the room (`connected`) or refuses it
//! (`error`); after that it streams `gift` frames until `streamEnd` or close.

use crate::{
    events::{FeedEvent, FeedSink, Subscription},
    Error, LiveFeed, Result,
};
use futures_util::StreamExt;
use giftdraw_types::{ConnectState, FeedFrame};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::timeout,
};
use tokio_tungstenite::{connect_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

/// Connects sessions to broadcasters through a feed relay.
#[derive(Clone, Debug)]
pub struct RelayFeed {
    base: Url,
    dial_timeout: Duration,
}

impl RelayFeed {
    /// Create a client for the relay at `base_url` (`ws://` or `wss://`).
    ///
    /// `dial_timeout` bounds both the WebSocket dial and the wait for the
    /// relay's first frame.
    pub fn new(base_url: &str, dial_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)?;
        match base.scheme() {
            "ws" | "wss" if !base.cannot_be_a_base() => {}
            other => return Err(Error::InvalidScheme(other.to_string())),
        }
        Ok(Self { base, dial_timeout })
    }

    /// Endpoint for `broadcaster`'s room. The name is percent-encoded as a
    /// single path segment.
    pub fn room_url(&self, broadcaster: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("live").push(broadcaster);
        }
        url
    }

    async fn dial(
        &self,
        url: &Url,
    ) -> Result<(
        WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
        ConnectState,
    )> {
        let (mut ws, _) = connect_async(url.as_str()).await?;
        let state = handshake(&mut ws).await?;
        Ok((ws, state))
    }
}

impl LiveFeed for RelayFeed {
    async fn connect<S: FeedSink>(&self, broadcaster: &str, sink: S) -> Result<Subscription> {
        let url = self.room_url(broadcaster);
        debug!(%url, "dialing feed relay");
        let (ws, state) = timeout(self.dial_timeout, self.dial(&url))
            .await
            .map_err(|_| Error::DialTimeout)??;
        debug!(broadcaster, room_id = ?state.room_id, "joined room");

        let handle = spawn_reader(ws, sink);
        Ok(Subscription::with_task(state, handle))
    }
}

async fn handshake<S>(ws: &mut WebSocketStream<S>) -> Result<ConnectState>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(message) = ws.next().await {
        match message? {
            Message::Text(text) => {
                return match serde_json::from_str::<FeedFrame>(&text)? {
                    FeedFrame::Connected(state) => Ok(state),
                    FeedFrame::Error { message } => Err(Error::Rejected(message)),
                    other => Err(Error::UnexpectedFrame(format!("{other:?}"))),
                };
            }
            Message::Close(_) => return Err(Error::ConnectionClosed),
            _ => continue,
        }
    }
    Err(Error::ConnectionClosed)
}

fn spawn_reader<S, K>(mut ws: WebSocketStream<S>, sink: K) -> tokio::task::JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    K: FeedSink,
{
    tokio::spawn(async move {
        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<FeedFrame>(&text) {
                    Ok(FeedFrame::Gift(gift)) => {
                        if !sink.deliver(FeedEvent::Gift(gift)).await {
                            return;
                        }
                    }
                    Ok(FeedFrame::StreamEnd) => {
                        debug!("feed stream ended");
                        sink.deliver(FeedEvent::StreamEnd).await;
                        return;
                    }
                    Ok(other) => debug!(?other, "ignoring feed frame"),
                    Err(err) => warn!(error = %err, "failed to decode feed frame"),
                },
                Ok(Message::Close(_)) => {
                    debug!("feed relay closed websocket");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "feed websocket error");
                    break;
                }
            }
        }
        sink.deliver(FeedEvent::Dropped).await;
    })
}
