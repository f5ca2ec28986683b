use std::error::Error;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, TransportError};

/// A successful answer from the service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The answer text, exactly as the service sent it.
    pub answer: String,
}

impl AnswerResponse {
    /// Parses a response body.
    ///
    /// The body must be a JSON object with a non-empty string `answer`
    /// field. Anything else is a [`MalformedResponse`].
    pub fn from_json_slice(body: &[u8]) -> Result<Self, MalformedResponse> {
        let value: Value = serde_json::from_slice(body).map_err(|err| {
            MalformedResponse::new(format!("invalid JSON: {err}"))
        })?;
        Self::from_value(value)
    }

    /// Extracts the answer from an already decoded body.
    pub fn from_value(value: Value) -> Result<Self, MalformedResponse> {
        let Value::Object(mut fields) = value else {
            return Err(MalformedResponse::new("body is not an object"));
        };
        match fields.remove("answer") {
            Some(Value::String(answer)) if !answer.is_empty() => {
                Ok(Self { answer })
            }
            Some(Value::String(_)) => {
                Err(MalformedResponse::new("`answer` is empty"))
            }
            Some(other) => Err(MalformedResponse::new(format!(
                "`answer` is not a string: {other}"
            ))),
            None => Err(MalformedResponse::new("`answer` is missing")),
        }
    }
}

/// A response arrived but carried no usable answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedResponse {
    reason: String,
}

impl MalformedResponse {
    /// Creates the error with a human-readable reason.
    #[inline]
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns why the response was rejected.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for MalformedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed response: {}", self.reason)
    }
}

impl Error for MalformedResponse {}

impl TransportError for MalformedResponse {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedResponse
    }
}
