//! JSON frames exchanged with clients over the session WebSocket.

use crate::{ConnectState, RewardMessage, SessionId};
use serde::{Deserialize, Serialize};

/// Frames sent by a client.
///
/// `updateParameters` carries its payload undecoded so that a malformed
/// parameter object can be rejected on its own (with the request id intact)
/// instead of failing the whole frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    ConnectRequest {
        #[serde(rename = "broadcasterName")]
        broadcaster_name: String,
    },
    DisconnectRequest,
    UpdateParameters {
        #[serde(rename = "requestId", default)]
        request_id: Option<String>,
        parameters: serde_json::Value,
    },
}

/// Events pushed to everyone watching a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    SessionStarted {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
    ConnectionStateChanged {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        #[serde(rename = "roomId", default, with = "crate::serde_id::optional")]
        room_id: Option<String>,
        #[serde(rename = "isConnected")]
        is_connected: bool,
    },
    RewardComputed(RewardMessage),
}

impl SessionEvent {
    pub fn connection_state(session_id: SessionId, state: ConnectState) -> Self {
        Self::ConnectionStateChanged {
            session_id,
            room_id: state.room_id,
            is_connected: state.is_connected,
        }
    }
}

/// Replies sent only to the client that issued a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerResponse {
    Ack {
        #[serde(rename = "requestId")]
        request_id: String,
    },
    Error {
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none", default)]
        request_id: Option<String>,
        code: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_frames() {
        let connect: InboundMessage =
            serde_json::from_str(r#"{"type":"connectRequest","broadcasterName":"alice"}"#).unwrap();
        assert!(matches!(
            connect,
            InboundMessage::ConnectRequest { broadcaster_name } if broadcaster_name == "alice"
        ));

        let disconnect: InboundMessage =
            serde_json::from_str(r#"{"type":"disconnectRequest"}"#).unwrap();
        assert!(matches!(disconnect, InboundMessage::DisconnectRequest));

        let update: InboundMessage = serde_json::from_str(
            r#"{"type":"updateParameters","requestId":"r1","parameters":{"raffle":1}}"#,
        )
        .unwrap();
        match update {
            InboundMessage::UpdateParameters {
                request_id,
                parameters,
            } => {
                assert_eq!(request_id.as_deref(), Some("r1"));
                assert_eq!(parameters, json!({ "raffle": 1 }));
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        assert!(serde_json::from_str::<InboundMessage>(r#"{"type":"bet"}"#).is_err());
    }

    #[test]
    fn test_connection_state_frame() {
        let event = SessionEvent::connection_state(
            SessionId::new("s-1"),
            ConnectState::disconnected(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "connectionStateChanged",
                "sessionId": "s-1",
                "roomId": null,
                "isConnected": false
            })
        );
        let decoded: SessionEvent = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_error_response_omits_missing_request_id() {
        let response = ServerResponse::Error {
            request_id: None,
            code: "INVALID_MESSAGE".to_string(),
            message: "bad".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "type": "error", "code": "INVALID_MESSAGE", "message": "bad" })
        );
    }
}
