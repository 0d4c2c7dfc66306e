//! Giftdraw reward execution.
//!
//! This crate turns admitted gifts into reward outcomes. It holds no state of
//! its own: callers supply the session's parameter snapshot and an RNG.
//!
//! ## Determinism requirements
//! - Do not read clocks or global RNGs; all randomness comes from the `Rng`
//!   passed in.
//! - Every draw consumes a fixed number of samples (one per raffle, one per
//!   non-empty pick), so a seeded RNG replays a session exactly.
//!
//! ```rust
//! use giftdraw_execution::{admission::admit, reward};
//! use giftdraw_types::{GiftNotification, SessionId, SessionParameters};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let gift = GiftNotification {
//!     gift_id: 1,
//!     repeat_count: 2,
//!     repeat_end: false,
//!     user_id: "42".into(),
//!     nickname: "viewer".into(),
//!     gift_type: 2,
//!     diamond_count: 10,
//! };
//! let mut params = SessionParameters::default();
//! params.raffle.probability = 1.0;
//!
//! let admitted = admit(gift).expect("non-combo gifts are always admitted");
//! let message = reward(&SessionId::new("s-1"), &admitted, &params, &mut StdRng::seed_from_u64(0));
//! assert_eq!(message.diamond, 20);
//! assert!(message.raffle.result);
//! ```

pub mod admission;
pub mod draw;
pub mod shaping;

pub use admission::{admit, AdmittedGift};
pub use draw::{draw_raffle, draw_weighted_raffle, pick_choice, weighted_probability};

use giftdraw_types::{RewardMessage, SessionId, SessionParameters};
use rand::Rng;
use tracing::debug;

/// Run all three draws for an admitted gift against one parameter snapshot.
pub fn reward<R: Rng + ?Sized>(
    session_id: &SessionId,
    admitted: &AdmittedGift,
    parameters: &SessionParameters,
    rng: &mut R,
) -> RewardMessage {
    let value = admitted.total_value as f64;
    let raffle = draw_raffle(parameters.raffle.probability, rng);
    let weighted_raffle = draw_weighted_raffle(value, &parameters.weighted_raffle, rng);
    let pick = pick_choice(&parameters.pick.choices, rng);
    debug!(
        session = %session_id,
        ?raffle,
        ?weighted_raffle,
        ?pick,
        "drew rewards"
    );

    RewardMessage {
        session_id: session_id.clone(),
        user_name: admitted.gift.nickname.clone(),
        diamond: admitted.total_value,
        raffle,
        weighted_raffle,
        pick,
    }
}
