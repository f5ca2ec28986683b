use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// How a scripted request fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetFailure {
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "status")]
    Status(u16),
    #[serde(rename = "network")]
    Network,
}

/// What the service does for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    /// Responds with this raw body, which still goes through answer
    /// parsing (so `{}` ends up as a malformed response).
    #[serde(rename = "body")]
    Body(Value),
    /// Fails before any body is received.
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

impl PresetReply {
    /// A well-formed body carrying `answer`.
    #[inline]
    pub fn answer<S: Into<String>>(answer: S) -> Self {
        let answer: String = answer.into();
        PresetReply::Body(json!({ "status": "success", "answer": answer }))
    }
}

/// One scripted step: a reply and how long the service takes to give it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetStep {
    pub reply: PresetReply,
    /// Overrides the transport's default delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl PresetStep {
    #[inline]
    pub fn new(reply: PresetReply) -> Self {
        Self {
            reply,
            delay_ms: None,
        }
    }

    #[inline]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}
