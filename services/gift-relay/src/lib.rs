//! Gift relay service.
//!
//! Accepts client sessions over WebSocket, binds each one to a broadcaster's
//! live feed, and pushes a reward outcome for every admitted gift using that
//! session's current parameters.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod store;

#[cfg(test)]
pub(crate) mod mocks;

pub use api::{Api, ApiConfig};
pub use config::{build_config, Args, RelayConfig};
pub use coordinator::{Coordinator, CoordinatorError, SessionState};
pub use store::{ParameterStore, StoreError};
