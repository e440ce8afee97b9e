//! Per-file upload parameters returned by the caller's resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP method of the upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `DELETE`
    Delete,
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `PATCH`
    Patch,
    /// `POST`
    #[default]
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// Raw request body replacing the multipart form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestBody {
    /// A text body, sent as-is.
    Text(String),
    /// A binary body.
    Bytes(Vec<u8>),
}

/// Where and how to upload one file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadParams {
    /// Destination address. `None` or empty settles the file in
    /// `ErrorUploadParams` without touching the network.
    pub url: Option<String>,
    /// Request method.
    pub method: HttpMethod,
    /// Body override; when absent the file is sent as multipart form
    /// data alongside `fields`.
    pub body: Option<RequestBody>,
    /// Extra multipart form fields, appended before the file.
    pub fields: BTreeMap<String, String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Metadata merged into the file when the upload starts.
    pub meta: Map<String, Value>,
    /// Per-call transport timeout in milliseconds.
    pub timeout_ms: Option<u32>,
}

impl UploadParams {
    /// `POST` to `url` with no extras.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the request method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a multipart form field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the multipart body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Add metadata to merge into the file.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Override the transport timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The destination address, if present and non-empty.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn method_defaults_to_post() {
        assert_eq!(UploadParams::default().method, HttpMethod::Post);
        assert_eq!(HttpMethod::default().as_str(), "POST");
    }

    #[test]
    fn method_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&HttpMethod::Patch).unwrap(), "\"PATCH\"");
    }

    #[test]
    fn destination_ignores_blank_urls() {
        assert_eq!(UploadParams::default().destination(), None);
        let mut params = UploadParams::new("  ");
        assert_eq!(params.destination(), None);
        params.url = Some("https://example.com/up".into());
        assert_eq!(params.destination(), Some("https://example.com/up"));
    }

    #[test]
    fn builder_collects_extras() {
        let params = UploadParams::new("/upload")
            .with_method(HttpMethod::Put)
            .with_field("folder", "inbox")
            .with_header("Authorization", "Bearer t")
            .with_meta("fileUrl", "/files/1")
            .with_timeout_ms(5_000);
        assert_eq!(params.method, HttpMethod::Put);
        assert_eq!(params.fields.get("folder").map(String::as_str), Some("inbox"));
        assert_eq!(
            params.headers.get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
        assert_eq!(params.meta.get("fileUrl"), Some(&Value::from("/files/1")));
        assert_eq!(params.timeout_ms, Some(5_000));
    }

    #[test]
    fn resolver_json_shape_deserializes() {
        let params: UploadParams = serde_json::from_str(
            r#"{ "url": "https://httpbin.org/post", "headers": { "X-Trace": "1" } }"#,
        )
        .unwrap();
        assert_eq!(params.destination(), Some("https://httpbin.org/post"));
        assert_eq!(params.method, HttpMethod::Post);
        assert!(params.body.is_none());
    }
}
