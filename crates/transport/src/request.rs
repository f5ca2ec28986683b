use std::fmt;
use std::path::Path;

use bytes::Bytes;
use mime::Mime;

/// A file the user picked to send along with a query.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Attachment {
    name: String,
    payload: Bytes,
}

impl Attachment {
    /// Creates an attachment from a file name and its raw contents.
    #[inline]
    pub fn new<S: Into<String>, B: Into<Bytes>>(name: S, payload: B) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Returns the file name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw contents.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Guesses the content type from the file extension.
    pub fn content_type(&self) -> Mime {
        let extension = Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => mime::TEXT_CSV,
            Some("txt") | Some("md") => mime::TEXT_PLAIN,
            Some("json") => mime::APPLICATION_JSON,
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("len", &self.payload.len())
            .finish()
    }
}

/// A request to the answering service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnswerRequest {
    /// The user's query text.
    pub query: String,
    /// The file sent along with the query, if any.
    pub attachment: Option<Attachment>,
}

impl AnswerRequest {
    /// Creates a query-only request.
    #[inline]
    pub fn query<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            attachment: None,
        }
    }

    /// Creates a request that uploads `attachment` with the query.
    #[inline]
    pub fn upload<S: Into<String>>(query: S, attachment: Attachment) -> Self {
        Self {
            query: query.into(),
            attachment: Some(attachment),
        }
    }

    /// Returns `true` if the request carries a file and must be sent as
    /// a multipart upload.
    #[inline]
    pub fn is_upload(&self) -> bool {
        self.attachment.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        let csv = Attachment::new("sales.CSV", "a,b\n1,2\n");
        assert_eq!(csv.content_type(), mime::TEXT_CSV);

        let notes = Attachment::new("notes.md", "# hi");
        assert_eq!(notes.content_type(), mime::TEXT_PLAIN);

        let blob = Attachment::new("dump", vec![0u8, 1, 2]);
        assert_eq!(blob.content_type(), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_debug_hides_payload() {
        let attachment = Attachment::new("secret.txt", "hunter2");
        let debug = format!("{attachment:?}");
        assert!(debug.contains("secret.txt"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_upload_selection() {
        assert!(!AnswerRequest::query("hi").is_upload());
        let attachment = Attachment::new("a.csv", "x");
        assert!(AnswerRequest::upload("sum it", attachment).is_upload());
    }
}
