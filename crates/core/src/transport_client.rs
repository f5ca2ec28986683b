use std::error::Error;
use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::Arc;

use datachat_transport::{
    AnswerRequest, AnswerResponse, ErrorKind, Transport, TransportError,
};
use tokio::task::JoinError;
use tracing::Instrument;

pub(crate) type SendResult = Result<AnswerResponse, Box<dyn TransportError>>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;
type HandlerFn = Arc<dyn Fn(AnswerRequest) -> BoxedSendFuture + Send + Sync>;

/// A type-erased wrapper around a [`Transport`], so that the chat state
/// does not need a generic parameter for it.
#[derive(Clone)]
pub struct TransportClient {
    handler_fn: HandlerFn,
}

impl TransportClient {
    #[inline]
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let upload = req.is_upload();
            let fut = transport.send(&req);
            Box::pin(
                async move {
                    trace!("sending a request");
                    match fut.await {
                        Ok(resp) => {
                            trace!("got {} bytes of answer", resp.answer.len());
                            Ok(resp)
                        }
                        Err(err) => {
                            debug!("request failed ({}): {err}", err.kind());
                            Err(Box::new(err) as Box<dyn TransportError>)
                        }
                    }
                }
                .instrument(trace_span!("transport req", upload)),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and waits for the parsed answer.
    ///
    /// # Cancel safety
    ///
    /// Dropping the returned future abandons the request; nothing is
    /// reported back.
    #[inline]
    pub async fn send(&self, req: AnswerRequest) -> SendResult {
        (self.handler_fn)(req).await
    }
}

/// The task running a request ended without a result.
#[derive(Debug)]
pub(crate) struct RequestAborted {
    panicked: bool,
}

impl From<JoinError> for RequestAborted {
    #[inline]
    fn from(err: JoinError) -> Self {
        Self {
            panicked: err.is_panic(),
        }
    }
}

impl Display for RequestAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.panicked {
            write!(f, "the transport panicked")
        } else {
            write!(f, "the request was cancelled")
        }
    }
}

impl Error for RequestAborted {}

impl TransportError for RequestAborted {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}
