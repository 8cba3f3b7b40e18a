use serde::{Deserialize, Serialize};

use crate::{protocol::snapshot::WorldSnapshot, sequencing::BeatState, Error, Result};

/// Everything that crosses the client/host channel.
///
/// ```text
/// client → host   { "type": "PING", "beat"?: { "step": 3, "change": true } }
/// host → client   { "type": "PONG", "payload": { ...WorldSnapshot } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "PING")]
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        beat: Option<BeatState>,
    },
    #[serde(rename = "PONG")]
    Pong { payload: WorldSnapshot },
}

impl Message {
    pub fn ping(beat: Option<BeatState>) -> Self {
        Message::Ping { beat }
    }

    pub fn pong(payload: WorldSnapshot) -> Self {
        Message::Pong { payload }
    }

    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Ping { .. } => "PING",
            Message::Pong { .. } => "PONG",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The beat carried by a PING.
    pub fn into_ping(self) -> Result<Option<BeatState>> {
        match self {
            Message::Ping { beat } => Ok(beat),
            other => Err(Error::UnexpectedMessage {
                expected: "PING",
                got: other.kind(),
            }),
        }
    }

    /// The snapshot carried by a PONG.
    pub fn into_pong(self) -> Result<WorldSnapshot> {
        match self {
            Message::Pong { payload } => Ok(payload),
            other => Err(Error::UnexpectedMessage {
                expected: "PONG",
                got: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_without_beat_has_no_beat_key() {
        assert_eq!(Message::ping(None).to_json().unwrap(), r#"{"type":"PING"}"#);
    }

    #[test]
    fn ping_with_beat() {
        let beat = BeatState {
            step: 3,
            changed: true,
        };
        assert_eq!(
            Message::ping(Some(beat)).to_json().unwrap(),
            r#"{"type":"PING","beat":{"step":3,"change":true}}"#
        );
    }

    #[test]
    fn parses_foreign_ping() {
        let msg = Message::from_json(r#"{ "beat": { "change": false, "step": 7 }, "type": "PING" }"#)
            .unwrap();
        assert_eq!(
            msg.into_ping().unwrap(),
            Some(BeatState {
                step: 7,
                changed: false
            })
        );
    }

    #[test]
    fn wrong_direction_is_an_error() {
        let err = Message::ping(None).into_pong().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedMessage {
                expected: "PONG",
                got: "PING"
            }
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            Message::from_json(r#"{"type":"HELLO"}"#),
            Err(Error::Protocol(_))
        ));
    }
}
