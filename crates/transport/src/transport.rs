use crate::error::TransportError;
use crate::request::AnswerRequest;
use crate::response::AnswerResponse;

/// A way of reaching the answering service.
///
/// A transport should behave like a stateless object: the caller may
/// keep it around for many requests, or drop it at any time, including
/// while a request future is still pending.
pub trait Transport: Send + Sync {
    /// The error type that may be returned by the transport.
    type Error: TransportError;

    /// Sends a request and resolves with the parsed answer.
    ///
    /// The returned future must not borrow from `self` or `req`.
    /// Timeouts, bad statuses and unusable bodies are all reported as
    /// errors, told apart by [`TransportError::kind`].
    fn send(
        &self,
        req: &AnswerRequest,
    ) -> impl Future<Output = Result<AnswerResponse, Self::Error>> + Send + 'static;
}
