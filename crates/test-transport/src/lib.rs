//! A local fake answering service for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use datachat_transport::{
    AnswerRequest, AnswerResponse, ErrorKind, Transport, TransportError,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl TransportError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Shared {
    script: VecDeque<PresetStep>,
    requests: Vec<AnswerRequest>,
}

/// A fake answering service driven by a script.
///
/// Every request consumes the next scripted step, in order, and resolves
/// after the step's delay (1 ms unless configured). Once the script runs
/// out, requests fail with [`ErrorKind::Other`]. Clones share the script
/// and the record of received requests, so a test can keep a clone
/// around to inspect what the client sent.
///
/// # Note
///
/// Delays use tokio's clock, so tests with paused time control exactly
/// when a reply lands.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    shared: Arc<Mutex<Shared>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    #[inline]
    pub fn push_step(&mut self, step: PresetStep) {
        self.lock().script.push_back(step);
    }

    #[inline]
    pub fn push_reply(&mut self, reply: PresetReply) {
        self.push_step(PresetStep::new(reply));
    }

    #[inline]
    pub fn push_answer<S: Into<String>>(&mut self, answer: S) {
        self.push_reply(PresetReply::answer(answer));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, oldest first.
    pub fn requests(&self) -> Vec<AnswerRequest> {
        self.lock().requests.clone()
    }

    /// Returns how many scripted steps have not been used yet.
    pub fn remaining_steps(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve(reply: PresetReply) -> Result<AnswerResponse, Error> {
    match reply {
        PresetReply::Body(body) => {
            AnswerResponse::from_value(body).map_err(|err| Error {
                message: err.reason().to_owned(),
                kind: err.kind(),
            })
        }
        PresetReply::Failure(PresetFailure::Timeout) => Err(Error {
            message: "request timed out".to_owned(),
            kind: ErrorKind::Timeout,
        }),
        PresetReply::Failure(PresetFailure::Status(code)) => Err(Error {
            message: format!("service answered with status {code}"),
            kind: ErrorKind::Status,
        }),
        PresetReply::Failure(PresetFailure::Network) => Err(Error {
            message: "connection refused".to_owned(),
            kind: ErrorKind::Network,
        }),
    }
}

impl Transport for ScriptedTransport {
    type Error = crate::Error;

    fn send(
        &self,
        req: &AnswerRequest,
    ) -> impl Future<Output = Result<AnswerResponse, Self::Error>> + Send + 'static
    {
        let step = {
            let mut shared = self.lock();
            shared.requests.push(req.clone());
            shared.script.pop_front()
        };
        let default_delay = self.delay.unwrap_or(Duration::from_millis(1));

        async move {
            let Some(step) = step else {
                return Err(Error {
                    message: "script has no more steps".to_owned(),
                    kind: ErrorKind::Other,
                });
            };
            let delay = step
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default_delay);
            sleep(delay).await;
            resolve(step.reply)
        }
    }
}
