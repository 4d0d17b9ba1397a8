//! Incoming HTTP request type.
//!
//! Built by the server from the raw hyper request, or by hand with
//! [`Request::builder`] in tests and harnesses. Cookies, query arguments and
//! `application/x-www-form-urlencoded` form fields are parsed eagerly; the raw
//! body stays available as bytes.

use std::collections::HashMap;
use std::str::FromStr;

use crate::method::Method;

/// An incoming HTTP request.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) cookies: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
    pub(crate) form: HashMap<String, String>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    pub(crate) session_id: String,
}

impl Request {
    /// Starts building a request by hand. The server builds requests from the
    /// wire; this entry point exists for tests and handler harnesses.
    pub fn builder(method: Method, path: &str) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.to_owned(),
            headers: Vec::new(),
            cookies: HashMap::new(),
            query: HashMap::new(),
            form: HashMap::new(),
            body: Vec::new(),
            session_id: String::new(),
        }
    }

    pub(crate) fn from_parts(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        query_string: Option<&str>,
        body: Vec<u8>,
    ) -> Self {
        let cookies = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("cookie"))
            .map(|(_, v)| parse_cookies(v))
            .unwrap_or_default();
        let query = query_string.map(parse_pairs).unwrap_or_default();
        let form = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .filter(|(_, v)| v.starts_with("application/x-www-form-urlencoded"))
            .map(|_| String::from_utf8_lossy(&body).into_owned())
            .map(|s| parse_pairs(&s))
            .unwrap_or_default();
        Self {
            method,
            path,
            headers,
            cookies,
            query,
            form,
            body,
            params: HashMap::new(),
            session_id: String::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// A query-string argument (`?state=0`).
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// A form field from an `application/x-www-form-urlencoded` body.
    pub fn form(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// A named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The session identifier for this request.
    ///
    /// Set by the dispatcher before any handler runs: the value of the
    /// `session_id` cookie, or the freshly issued identifier when the request
    /// carried none.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Hand-construction of a [`Request`].
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    body: Vec<u8>,
    session_id: String,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn arg(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn form(mut self, name: &str, value: &str) -> Self {
        self.form.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn session_id(mut self, id: &str) -> Self {
        self.session_id = id.to_owned();
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            headers: self.headers,
            cookies: self.cookies,
            query: self.query,
            form: self.form,
            body: self.body,
            params: HashMap::new(),
            session_id: self.session_id,
        }
    }
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

fn parse_pairs(encoded: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(encoded)
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

pub(crate) fn parse_method(raw: &str) -> Option<Method> {
    Method::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookies_split_on_semicolons() {
        let cookies = parse_cookies("session_id=abc; theme=dark");
        assert_eq!(cookies.get("session_id").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn form_parses_urlencoded_bodies() {
        let req = Request::from_parts(
            Method::Post,
            "/login".to_owned(),
            vec![("content-type".to_owned(), "application/x-www-form-urlencoded".to_owned())],
            None,
            b"user=alice&state=1".to_vec(),
        );
        assert_eq!(req.form("user"), Some("alice"));
        assert_eq!(req.form("state"), Some("1"));
    }

    #[test]
    fn query_string_decodes_percent_escapes() {
        let req = Request::from_parts(
            Method::Get,
            "/login".to_owned(),
            Vec::new(),
            Some("state=0&name=a%20b"),
            Vec::new(),
        );
        assert_eq!(req.arg("state"), Some("0"));
        assert_eq!(req.arg("name"), Some("a b"));
    }
}
