//! A transport that reaches the answering service over HTTP.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use datachat_transport::{
    AnswerRequest, AnswerResponse, ErrorKind, MalformedResponse, Transport,
    TransportError,
};
use reqwest::{Client, RequestBuilder, Response, header};
use tracing::Instrument;

pub use config::{HttpTransportConfig, HttpTransportConfigBuilder};

/// Error type for [`HttpTransport`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_status() {
            ErrorKind::Status
        } else if err.is_builder() {
            ErrorKind::Other
        } else {
            ErrorKind::Network
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MalformedResponse> for Error {
    fn from(err: MalformedResponse) -> Self {
        Self::new(err.reason(), ErrorKind::MalformedResponse)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// HTTP transport: JSON for plain queries, multipart for uploads.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    config: Arc<HttpTransportConfig>,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` with the given configuration.
    #[inline]
    pub fn new(config: HttpTransportConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn prepare(&self, req: &AnswerRequest) -> Result<RequestBuilder, Error> {
        let builder = match &req.attachment {
            Some(attachment) => {
                let form = proto::upload_form(&req.query, attachment)
                    .map_err(Error::from_reqwest)?;
                self.client.post(self.config.upload_url()).multipart(form)
            }
            None => self
                .client
                .post(self.config.chat_url())
                .json(&proto::QueryBody { query: &req.query }),
        };
        Ok(builder
            .timeout(self.config.timeout)
            .header(header::ACCEPT, "application/json"))
    }
}

impl Transport for HttpTransport {
    type Error = Error;

    fn send(
        &self,
        req: &AnswerRequest,
    ) -> impl Future<Output = Result<AnswerResponse, Self::Error>> + Send + 'static
    {
        let prepared = self.prepare(req);
        let span = trace_span!("http request", upload = req.is_upload());
        execute(prepared).instrument(span)
    }
}

async fn execute(
    prepared: Result<RequestBuilder, Error>,
) -> Result<AnswerResponse, Error> {
    let resp = match prepared?
        .send()
        .await
        .and_then(Response::error_for_status)
    {
        Ok(resp) => resp,
        Err(err) => {
            debug!("request failed: {err}");
            return Err(Error::from_reqwest(err));
        }
    };

    let content_type = resp.headers().get(header::CONTENT_TYPE);
    if !proto::is_json_content_type(content_type) {
        return Err(Error::new(
            format!("unexpected content type: {content_type:?}"),
            ErrorKind::MalformedResponse,
        ));
    }

    let body = resp.bytes().await.map_err(Error::from_reqwest)?;
    trace!("received {} bytes", body.len());
    Ok(AnswerResponse::from_json_slice(&body)?)
}
