//! Frames emitted by a live feed relay over its WebSocket.

use crate::{ConnectState, GiftNotification};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedFrame {
    /// First frame after a successful join of the broadcaster's room.
    Connected(ConnectState),
    /// The relay could not join the room.
    Error { message: String },
    Gift(GiftNotification),
    /// The broadcast ended; no further frames follow.
    StreamEnd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_frames() {
        let connected: FeedFrame =
            serde_json::from_str(r#"{"type":"connected","roomId":"7","isConnected":true}"#)
                .unwrap();
        assert_eq!(connected, FeedFrame::Connected(ConnectState::connected("7")));

        let gift: FeedFrame = serde_json::from_value(json!({
            "type": "gift",
            "giftId": 1,
            "repeatCount": 2,
            "repeatEnd": true,
            "userId": 9,
            "nickname": "n",
            "giftType": 1,
            "diamondCount": 10
        }))
        .unwrap();
        match gift {
            FeedFrame::Gift(gift) => {
                assert_eq!(gift.repeat_count, 2);
                assert_eq!(gift.user_id, "9");
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        let end: FeedFrame = serde_json::from_str(r#"{"type":"streamEnd"}"#).unwrap();
        assert_eq!(end, FeedFrame::StreamEnd);
    }
}
