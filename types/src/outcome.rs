use crate::{ShapingFunctionKind, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaffleOutcome {
    pub probability: f64,
    pub result: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedRaffleOutcome {
    pub probability: f64,
    pub result: bool,
    pub func_type: ShapingFunctionKind,
}

/// Result of picking from a list. `result` is absent when there was nothing
/// to pick from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickOutcome<T> {
    pub choices: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

/// Everything drawn for one admitted gift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardMessage {
    pub session_id: SessionId,
    pub user_name: String,
    pub diamond: u64,
    pub raffle: RaffleOutcome,
    pub weighted_raffle: WeightedRaffleOutcome,
    pub pick: PickOutcome<String>,
}
