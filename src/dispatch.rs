//! Request dispatch: the single per-request entry point and the only place
//! where faults become HTTP responses.
//!
//! Per request: resolve the session identity from the `session_id` cookie
//! (issuing a fresh identifier — staged as a `Set-Cookie` header — when the
//! cookie is absent), resolve the path to an endpoint, invoke the handler by
//! its kind, and normalize the reply. Any [`Fault`] raised along the way is
//! translated here through the [`ErrorMap`], and nowhere else.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error};

use crate::assets;
use crate::error::{ErrorMap, Fault};
use crate::handler::HandlerEntry;
use crate::request::Request;
use crate::response::{Reply, Response};
use crate::router::Router;
use crate::session::{SessionStore, create_session_id};

/// Value of the `server` header stamped on wrapped fragment replies.
const SERVER_BANNER: &str = concat!("kado/", env!("CARGO_PKG_VERSION"));

/// The per-request dispatcher. Built once from an [`App`](crate::App); shared
/// read-only across connections.
pub struct Dispatcher {
    router: Router,
    sessions: Arc<SessionStore>,
    errors: ErrorMap,
}

impl Dispatcher {
    pub(crate) fn new(router: Router, sessions: Arc<SessionStore>, errors: ErrorMap) -> Self {
        Self { router, sessions, errors }
    }

    /// The session store this dispatcher resolves identities against.
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Handles one request end to end. Never fails: every fault is translated
    /// into a response at this boundary.
    pub async fn handle(&self, mut req: Request) -> Response {
        // Staged headers are attached to wrapped fragments only; handlers that
        // build a full Response own every header on it.
        let mut staged: Vec<(String, String)> = vec![("server".to_owned(), SERVER_BANNER.to_owned())];

        // Session identity is issued optimistically: the cookie goes out on
        // the first response, before any session data exists for it.
        req.session_id = match req.cookie("session_id") {
            Some(id) => id.to_owned(),
            None => {
                let id = create_session_id();
                staged.push(("set-cookie".to_owned(), format!("session_id={id}")));
                id
            }
        };

        match self.try_dispatch(req, &staged).await {
            Ok(response) => response,
            Err(fault) => match self.errors.respond(&fault) {
                Some(response) => response,
                None => {
                    error!(code = fault.code(), "unmapped fault: {fault}");
                    ErrorMap::fallback()
                }
            },
        }
    }

    async fn try_dispatch(
        &self,
        mut req: Request,
        staged: &[(String, String)],
    ) -> Result<Response, Fault> {
        let resolution = self.router.resolve(req.path())?;
        let entry = self
            .router
            .entry(&resolution.endpoint)
            .ok_or(Fault::NotFound)?;
        debug!(
            method = %req.method(),
            path = %req.path(),
            endpoint = %resolution.endpoint,
            kind = entry.kind(),
            "dispatch"
        );
        req.params = resolution.params;

        let reply = match entry {
            HandlerEntry::Route { f, methods } => {
                if !methods.contains(&req.method()) {
                    // Historical wire surface: unsupported method on a
                    // function route answers 401, not 405.
                    return Err(Fault::MethodNotAllowed);
                }
                f.invoke(req).await?
            }
            HandlerEntry::View(view) => view.dispatch(&req).await?,
            HandlerEntry::Static => {
                // Static responses are complete as built: no staged headers,
                // no normalization.
                let rel = resolution.static_path.unwrap_or_default();
                return assets::serve(Path::new(&rel));
            }
        };

        Ok(finalize(reply, staged))
    }
}

/// Normalizes a handler reply: full responses pass through untouched; raw
/// fragments are wrapped as `text/html; charset=UTF-8` with the staged
/// headers attached and status 200.
fn finalize(reply: Reply, staged: &[(String, String)]) -> Response {
    match reply {
        Reply::Full(response) => response,
        Reply::Fragment(body) => {
            let mut response = Response::html(body);
            for (name, value) in staged {
                response.push_header(name, value);
            }
            response
        }
    }
}
