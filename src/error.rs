//! The fault taxonomy and the code → response table.
//!
//! Every failure a handler or collaborator can raise is a [`Fault`] carrying a
//! string code. Faults propagate untranslated up to the dispatcher, which is
//! the only place codes become HTTP responses — via an [`ErrorMap`] lookup.
//! Infrastructure failures (bind, accept, session directory) are a separate
//! [`Error`] and never travel through the fault table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error as ThisError;

use crate::response::Response;

/// A dispatch-level failure with a string code.
///
/// Codes follow the historical numbering: `2` file-not-found, `13`
/// permission-denied, `401` unsupported-request-method, `404` not-found,
/// `503` unknown-handler-kind. Registration faults carry an empty code and
/// fall through to the generic entry when they ever reach the boundary.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Fault {
    #[error("file not found")]
    FileNotFound,
    #[error("require read permission")]
    PermissionDenied,
    #[error("unknown or unsupported request method")]
    MethodNotAllowed,
    #[error("source not found")]
    NotFound,
    #[error("unknown handler kind")]
    UnknownHandlerKind,
    #[error("url `{0}` is already registered")]
    DuplicatePath(String),
    #[error("endpoint `{0}` is already registered")]
    DuplicateEndpoint(String),
    #[error("invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },
}

impl Fault {
    /// The string code looked up in the [`ErrorMap`] at the dispatch boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound        => "2",
            Self::PermissionDenied    => "13",
            // 401 kept for compatibility with the historical wire surface,
            // even though 405 would be the standard choice.
            Self::MethodNotAllowed    => "401",
            Self::NotFound            => "404",
            Self::UnknownHandlerKind  => "503",
            Self::DuplicatePath(_)
            | Self::DuplicateEndpoint(_)
            | Self::InvalidRoute { .. } => "",
        }
    }
}

// ── Error table ───────────────────────────────────────────────────────────────

/// A renderer invoked in place of a canned body: returns `(body, content_type,
/// status)`.
pub type ErrorRenderer = Arc<dyn Fn() -> (String, String, u16) + Send + Sync>;

/// One entry in the code → response table.
enum ErrorEntry {
    /// A ready response body with a fixed status.
    Canned { body: String, status: u16 },
    /// A callable producing body, content type and status on demand.
    Render(ErrorRenderer),
}

/// The code → response table consulted once per failed request.
///
/// [`ErrorMap::defaults`] seeds the historical entries. [`ErrorMap::rebind`]
/// replaces the renderer for a numeric code, so applications can reskin an
/// error page without touching the dispatch path:
///
/// ```rust
/// use kado::ErrorMap;
///
/// let mut errors = ErrorMap::defaults();
/// errors.rebind(404, || {
///     ("<h1>nothing here</h1>".into(), "text/html; charset=UTF-8".into(), 404)
/// });
/// ```
pub struct ErrorMap {
    entries: HashMap<String, ErrorEntry>,
}

impl ErrorMap {
    /// The table with the five historical entries seeded.
    pub fn defaults() -> Self {
        let mut entries = HashMap::new();
        for (code, body) in [
            ("2", "<h1>E2 Not Found File</h1>"),
            ("13", "<h1>E13 No Read Permission</h1>"),
            ("401", "<h1>401 Unknown or unsupported method.</h1>"),
            ("404", "<h1>404 Source Not Found.</h1>"),
            ("503", "<h1>503 Unknown function type.</h1>"),
        ] {
            entries.insert(code.to_owned(), ErrorEntry::Canned { body: body.to_owned(), status: status_for(code) });
        }
        Self { entries }
    }

    /// An empty table. Every fault then renders the generic fallback.
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Replaces the entry for `code` with a renderer.
    pub fn rebind<F>(&mut self, code: u16, renderer: F)
    where
        F: Fn() -> (String, String, u16) + Send + Sync + 'static,
    {
        self.entries.insert(code.to_string(), ErrorEntry::Render(Arc::new(renderer)));
    }

    /// Translates a fault into a response, or `None` when its code has no entry.
    pub(crate) fn respond(&self, fault: &Fault) -> Option<Response> {
        match self.entries.get(fault.code())? {
            ErrorEntry::Canned { body, status } => Some(
                Response::builder()
                    .status(*status)
                    .body("text/html; charset=UTF-8", body.clone().into_bytes()),
            ),
            ErrorEntry::Render(f) => {
                let (body, content_type, status) = f();
                Some(Response::builder().status(status).body(&content_type, body.into_bytes()))
            }
        }
    }

    /// The last-resort response for faults with no table entry.
    pub(crate) fn fallback() -> Response {
        Response::builder()
            .status(500)
            .body("text/html; charset=UTF-8", b"<h1>500 Internal Server Error</h1>".to_vec())
    }
}

impl fmt::Debug for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMap").field("codes", &self.entries.keys().collect::<Vec<_>>()).finish()
    }
}

/// Canned-entry status rule: a code above 99 is used verbatim, anything lower
/// collapses to 500.
fn status_for(code: &str) -> u16 {
    code.parse::<u16>().ok().filter(|c| *c > 99).unwrap_or(500)
}

// ── Infrastructure error ──────────────────────────────────────────────────────

/// The error type returned by kado's fallible infrastructure operations.
///
/// Dispatch-level failures (404, 401, etc.) are [`Fault`]s and are translated
/// into HTTP responses at the dispatcher boundary. This type surfaces what the
/// process itself cannot recover from in a request: binding a port, accepting
/// a connection, or preparing the session directory.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rule_uses_code_above_99() {
        assert_eq!(status_for("404"), 404);
        assert_eq!(status_for("503"), 503);
        assert_eq!(status_for("2"), 500);
        assert_eq!(status_for("13"), 500);
        assert_eq!(status_for(""), 500);
    }

    #[test]
    fn defaults_cover_the_five_codes() {
        let map = ErrorMap::defaults();
        for fault in [
            Fault::FileNotFound,
            Fault::PermissionDenied,
            Fault::MethodNotAllowed,
            Fault::NotFound,
            Fault::UnknownHandlerKind,
        ] {
            assert!(map.respond(&fault).is_some(), "no entry for code {}", fault.code());
        }
    }

    #[test]
    fn file_not_found_renders_500() {
        let map = ErrorMap::defaults();
        let resp = map.respond(&Fault::FileNotFound).unwrap();
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.body(), b"<h1>E2 Not Found File</h1>");
    }

    #[test]
    fn registration_faults_have_no_entry() {
        let map = ErrorMap::defaults();
        assert!(map.respond(&Fault::DuplicatePath("/x".into())).is_none());
    }

    #[test]
    fn rebind_replaces_the_canned_entry() {
        let mut map = ErrorMap::defaults();
        map.rebind(404, || ("gone".into(), "text/plain".into(), 404));
        let resp = map.respond(&Fault::NotFound).unwrap();
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.body(), b"gone");
    }
}
