use datachat_transport::Attachment;
use mime::Mime;
use reqwest::header::HeaderValue;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

/// Body of a query-only request.
#[derive(Serialize)]
pub struct QueryBody<'a> {
    pub query: &'a str,
}

/// Builds the multipart body of an upload: the file under `file`, the
/// query text under `query`.
pub fn upload_form(
    query: &str,
    attachment: &Attachment,
) -> Result<Form, reqwest::Error> {
    let file = Part::bytes(attachment.payload().to_vec())
        .file_name(attachment.name().to_owned())
        .mime_str(attachment.content_type().as_ref())?;
    Ok(Form::new()
        .part("file", file)
        .text("query", query.to_owned()))
}

/// Returns `false` only when the response declares a content type that
/// is not JSON. A missing header is given the benefit of the doubt.
pub fn is_json_content_type(content_type: Option<&HeaderValue>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    content_type
        .to_str()
        .ok()
        .and_then(|v| v.parse::<Mime>().ok())
        .map(|m| {
            m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_query_body() {
        let body = serde_json::to_value(QueryBody { query: "total?" }).unwrap();
        assert_eq!(body, json!({ "query": "total?" }));
    }

    #[test]
    fn test_upload_form() {
        let attachment = Attachment::new("sales.csv", "region,total\n");
        let form = upload_form("sum totals", &attachment).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_json_content_types() {
        let json = HeaderValue::from_static("application/json; charset=utf-8");
        assert!(is_json_content_type(Some(&json)));

        let problem = HeaderValue::from_static("application/problem+json");
        assert!(is_json_content_type(Some(&problem)));

        let html = HeaderValue::from_static("text/html");
        assert!(!is_json_content_type(Some(&html)));

        assert!(is_json_content_type(None));
    }
}
