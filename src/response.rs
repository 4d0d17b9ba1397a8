//! Outgoing HTTP response type and the [`Reply`] handler-result type.
//!
//! Handlers produce a [`Reply`]: either a complete [`Response`] (returned to
//! the client exactly as built) or a bare HTML fragment that the dispatcher
//! wraps with `text/html; charset=UTF-8`, the staged headers, and status 200.
//! Only fragments pick up staged headers — a handler that builds its own
//! `Response` takes full responsibility for every header on it.

use bytes::Bytes;
use http_body_util::Full;

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use kado::Response;
///
/// Response::html("<h1>hi</h1>");
/// Response::text("hello");
/// Response::redirect("/login");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use kado::Response;
///
/// Response::builder()
///     .status(201)
///     .header("location", "/users/42")
///     .html("<h1>created</h1>");
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `text/html; charset=UTF-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type("text/html; charset=UTF-8", body.into().into_bytes())
    }

    /// `200 OK` — `text/plain; charset=UTF-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type("text/plain; charset=UTF-8", body.into().into_bytes())
    }

    /// A `302 Found` redirect to `url`, empty body.
    pub fn redirect(url: &str) -> Self {
        Self {
            body: Vec::new(),
            headers: vec![("location".to_owned(), url.to_owned())],
            status: 302,
        }
    }

    /// `200 OK` — a JSON value.
    ///
    /// Arrays and objects serialize as `application/json; charset=UTF-8`.
    /// Scalar values render their plain string form as `text/plain;
    /// charset=UTF-8`, matching the historical behavior of the JSON helper.
    pub fn json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Array(_) | Value::Object(_) => {
                let body = serde_json::to_string(value).unwrap_or_default();
                Self::with_content_type("application/json; charset=UTF-8", body.into_bytes())
            }
            Value::String(s) => Self::with_content_type(
                "text/plain; charset=UTF-8",
                s.clone().into_bytes(),
            ),
            other => Self::with_content_type(
                "text/plain; charset=UTF-8",
                other.to_string().into_bytes(),
            ),
        }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: 200 }
    }

    fn with_content_type(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: 200,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup (first match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends a header in place. Used by the dispatcher to attach staged
    /// headers to wrapped fragments.
    pub(crate) fn push_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts into the hyper wire type.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let status = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to status 200. Terminated by a
/// body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with an HTML body (`text/html; charset=UTF-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.body("text/html; charset=UTF-8", body.into().into_bytes())
    }

    /// Terminate with an explicitly typed body.
    pub fn body(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }

    /// Terminate with no body (redirects, 204s).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// What a handler hands back to the dispatcher.
pub enum Reply {
    /// A complete response, passed through untouched.
    Full(Response),
    /// A raw HTML fragment, wrapped by the dispatcher.
    Fragment(String),
}

impl From<Response> for Reply {
    fn from(r: Response) -> Self {
        Self::Full(r)
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Self::Fragment(s)
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Self::Fragment(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_serializes_as_json() {
        let resp = Response::json(&json!({"name": "alice"}));
        assert_eq!(resp.header("content-type"), Some("application/json; charset=UTF-8"));
        assert_eq!(resp.body(), br#"{"name":"alice"}"#);
    }

    #[test]
    fn json_scalar_renders_as_plain_text() {
        let resp = Response::json(&json!("hello"));
        assert_eq!(resp.header("content-type"), Some("text/plain; charset=UTF-8"));
        assert_eq!(resp.body(), b"hello");
    }

    #[test]
    fn redirect_carries_location() {
        let resp = Response::redirect("/login");
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.header("location"), Some("/login"));
        assert!(resp.body().is_empty());
    }
}
