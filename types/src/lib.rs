//! Common types shared by the giftdraw crates.
//!
//! Everything in here crosses a process boundary at some point: reward
//! parameters arrive from clients, gift notifications arrive from the live
//! feed relay, and outcomes are pushed back to clients. All wire keys are
//! camelCase.

pub mod api;
pub mod feed;
pub mod gift;
pub mod outcome;
pub mod parameters;
mod serde_id;

pub use api::{InboundMessage, ServerResponse, SessionEvent};
pub use feed::FeedFrame;
pub use gift::{ConnectState, GiftNotification, COMBO_GIFT_TYPE};
pub use outcome::{PickOutcome, RaffleOutcome, RewardMessage, WeightedRaffleOutcome};
pub use parameters::{
    ParameterError, PickConfig, RaffleConfig, SessionParameters, ShapingFunctionKind,
    WeightedRaffleConfig,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one client session.
///
/// The transport decides how ids are minted; the core only compares them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
