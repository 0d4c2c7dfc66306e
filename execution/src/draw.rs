//! Draw primitives.
//!
//! Each draw consumes uniform samples in `[0, 1)` from the supplied RNG and is
//! otherwise a pure function of its inputs, so a seeded RNG reproduces the
//! same outcomes.

use crate::shaping::shape;
use giftdraw_types::{PickOutcome, RaffleOutcome, WeightedRaffleConfig, WeightedRaffleOutcome};
use rand::Rng;

fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

fn hit<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    let threshold = 1.0 - probability;
    uniform(rng) >= threshold
}

/// Win with a flat `probability`.
///
/// A probability of 0 never wins and a probability of 1 always wins, since
/// samples are strictly below 1.
pub fn draw_raffle<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> RaffleOutcome {
    RaffleOutcome {
        probability,
        result: hit(probability, rng),
    }
}

/// Win probability of a weighted raffle for a gift worth `value`.
///
/// The ratio `value / limit` is shaped by the configured curve and clamped to
/// `[min_probability, max_probability]` (upper bound applied last, so inverted
/// bounds yield `max_probability`). A `limit` that is not strictly positive
/// means infinite weight: the curve is skipped and `max_probability` is
/// returned.
pub fn weighted_probability(value: f64, config: &WeightedRaffleConfig) -> f64 {
    if !(config.limit > 0.0 && config.limit.is_finite()) {
        return config.max_probability;
    }
    let raw = shape(value / config.limit, config.func_type);
    config.min_probability.max(raw).min(config.max_probability)
}

pub fn draw_weighted_raffle<R: Rng + ?Sized>(
    value: f64,
    config: &WeightedRaffleConfig,
    rng: &mut R,
) -> WeightedRaffleOutcome {
    let probability = weighted_probability(value, config);
    WeightedRaffleOutcome {
        probability,
        result: hit(probability, rng),
        func_type: config.func_type,
    }
}

/// Pick one of `choices` uniformly. Picking from an empty list yields no
/// result and consumes no randomness.
pub fn pick_choice<T: Clone, R: Rng + ?Sized>(choices: &[T], rng: &mut R) -> PickOutcome<T> {
    let result = match choices.len() {
        0 => None,
        len => {
            let index = (uniform(rng) * len as f64).floor() as usize;
            choices.get(index.min(len - 1)).cloned()
        }
    };
    PickOutcome {
        choices: choices.to_vec(),
        result,
    }
}
