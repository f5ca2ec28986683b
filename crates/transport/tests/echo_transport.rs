use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use datachat_transport::{
    AnswerRequest, AnswerResponse, Attachment, ErrorKind, Transport,
    TransportError,
};
use serde_json::json;
use tokio::time::sleep;

#[derive(Debug)]
struct EchoError(ErrorKind);

impl Display for EchoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for EchoError {}

impl TransportError for EchoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Answers with the query echoed back, as the service would have
/// serialized it.
struct EchoTransport;

impl Transport for EchoTransport {
    type Error = EchoError;

    fn send(
        &self,
        req: &AnswerRequest,
    ) -> impl Future<Output = Result<AnswerResponse, Self::Error>> + Send + 'static
    {
        let body = match &req.attachment {
            _ if req.query.is_empty() => json!({ "status": "error" }),
            Some(attachment) => json!({
                "answer": format!("{} ({})", req.query, attachment.name()),
            }),
            None => json!({ "answer": format!("You said {}", req.query) }),
        };
        let result = AnswerResponse::from_value(body)
            .map_err(|err| EchoError(err.kind()));
        async move {
            sleep(Duration::from_millis(1)).await;
            result
        }
    }
}

#[tokio::test]
async fn test_query_round_trip() {
    let resp = EchoTransport
        .send(&AnswerRequest::query("Good morning"))
        .await
        .unwrap();
    assert_eq!(resp.answer, "You said Good morning");
}

#[tokio::test]
async fn test_upload_round_trip() {
    let attachment = Attachment::new("table.csv", "a,b\n1,2\n");
    let req = AnswerRequest::upload("sum b", attachment);
    let resp = EchoTransport.send(&req).await.unwrap();
    assert_eq!(resp.answer, "sum b (table.csv)");
}

#[tokio::test]
async fn test_missing_answer_is_malformed() {
    let err = EchoTransport
        .send(&AnswerRequest::query(""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

