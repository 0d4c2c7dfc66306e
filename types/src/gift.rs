use serde::{Deserialize, Serialize};

/// `giftType` of gifts that repeat while a combo streak is building.
pub const COMBO_GIFT_TYPE: i64 = 1;

/// A gift sent by a viewer, as reported by the live feed.
///
/// For combo gifts the feed reports every increment of the streak, and only
/// the final notification (`repeat_end == true`) carries the true count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftNotification {
    pub gift_id: u64,
    pub repeat_count: u32,
    pub repeat_end: bool,
    #[serde(with = "crate::serde_id::required")]
    pub user_id: String,
    pub nickname: String,
    pub gift_type: i64,
    pub diamond_count: u64,
}

impl GiftNotification {
    pub fn is_combo(&self) -> bool {
        self.gift_type == COMBO_GIFT_TYPE
    }
}

/// Connection state of a session's live feed, as pushed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectState {
    #[serde(default, with = "crate::serde_id::optional")]
    pub room_id: Option<String>,
    pub is_connected: bool,
}

impl ConnectState {
    pub fn connected(room_id: impl Into<String>) -> Self {
        Self {
            room_id: Some(room_id.into()),
            is_connected: true,
        }
    }

    /// The notice pushed on every transition into a closed feed.
    pub fn disconnected() -> Self {
        Self {
            room_id: None,
            is_connected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gift_accepts_numeric_and_string_user_ids() {
        let numeric: GiftNotification = serde_json::from_value(json!({
            "giftId": 5655,
            "repeatCount": 3,
            "repeatEnd": false,
            "userId": 6813181309701180417u64,
            "nickname": "viewer",
            "giftType": 1,
            "diamondCount": 1
        }))
        .unwrap();
        assert_eq!(numeric.user_id, "6813181309701180417");
        assert!(numeric.is_combo());

        let text: GiftNotification = serde_json::from_value(json!({
            "giftId": 5655,
            "repeatCount": 1,
            "repeatEnd": true,
            "userId": "abc",
            "nickname": "viewer",
            "giftType": 2,
            "diamondCount": 99
        }))
        .unwrap();
        assert_eq!(text.user_id, "abc");
        assert!(!text.is_combo());
    }

    #[test]
    fn test_connect_state_wire_shape() {
        let value = serde_json::to_value(ConnectState::disconnected()).unwrap();
        assert_eq!(value, json!({ "roomId": null, "isConnected": false }));

        let value = serde_json::to_value(ConnectState::connected("7123")).unwrap();
        assert_eq!(value, json!({ "roomId": "7123", "isConnected": true }));

        let decoded: ConnectState =
            serde_json::from_value(json!({ "roomId": 7123, "isConnected": true })).unwrap();
        assert_eq!(decoded, ConnectState::connected("7123"));
    }
}
