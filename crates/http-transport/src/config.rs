use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`HttpTransportConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpTransportConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    chat_path: Option<String>,
    upload_path: Option<String>,
}

impl HttpTransportConfigBuilder {
    /// Creates a builder pointing at the given service URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Sets how long a request may take, connection and body included.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the path for query-only requests.
    #[inline]
    pub fn with_chat_path<S: Into<String>>(mut self, path: S) -> Self {
        self.chat_path = Some(path.into());
        self
    }

    /// Sets the path for requests that upload a file.
    #[inline]
    pub fn with_upload_path<S: Into<String>>(mut self, path: S) -> Self {
        self.upload_path = Some(path.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HttpTransportConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        HttpTransportConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            chat_path: normalize_path(self.chat_path, "/chat"),
            upload_path: normalize_path(self.upload_path, "/upload"),
        }
    }
}

fn normalize_path(path: Option<String>, default: &str) -> String {
    match path {
        Some(path) if path.starts_with('/') => path,
        Some(path) => format!("/{path}"),
        None => default.to_owned(),
    }
}

/// Configuration for [`crate::HttpTransport`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpTransportConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) chat_path: String,
    pub(crate) upload_path: String,
}

impl HttpTransportConfig {
    #[inline]
    pub(crate) fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    #[inline]
    pub(crate) fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, self.upload_path)
    }

    /// Returns the request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
