//! URL → endpoint → handler tables.
//!
//! Two associations, both write-once at startup: a radix tree from path to
//! endpoint name, and a map from endpoint name to [`HandlerEntry`]. Endpoint
//! names are the uniqueness key for handlers; the single reserved `static`
//! endpoint is shared by every static-asset path and is exempt from that
//! uniqueness rule.

use std::collections::{HashMap, HashSet};

use matchit::Router as MatchitRouter;

use crate::error::Fault;
use crate::handler::HandlerEntry;

/// The reserved endpoint all static-asset paths resolve to.
pub const STATIC_ENDPOINT: &str = "static";

/// The application router.
///
/// Build it once at startup (usually through [`App`](crate::App)); it is
/// read-only while serving. Path parameters use `{name}` syntax and surface
/// on the request via [`Request::param`](crate::Request::param).
pub struct Router {
    urls: MatchitRouter<String>,
    paths: HashSet<String>,
    handlers: HashMap<String, HandlerEntry>,
    static_folder: String,
}

/// The outcome of a successful path resolution.
#[derive(Debug)]
pub struct Resolution {
    pub endpoint: String,
    pub(crate) params: HashMap<String, String>,
    /// For the `static` endpoint: the request path with the leading separator
    /// stripped, i.e. a filesystem-relative path.
    pub(crate) static_path: Option<String>,
}

impl Router {
    /// A router whose static-asset prefix is `static_folder`.
    pub fn new(static_folder: &str) -> Self {
        Self {
            urls: MatchitRouter::new(),
            paths: HashSet::new(),
            handlers: HashMap::new(),
            static_folder: static_folder.to_owned(),
        }
    }

    /// Registers `path` → `endpoint` → `entry`.
    ///
    /// Fails with [`Fault::DuplicatePath`] when the path is taken, and with
    /// [`Fault::DuplicateEndpoint`] when the endpoint name is taken by
    /// anything other than the reserved static endpoint.
    pub fn register(&mut self, path: &str, endpoint: &str, entry: HandlerEntry) -> Result<(), Fault> {
        if self.paths.contains(path) {
            return Err(Fault::DuplicatePath(path.to_owned()));
        }
        if self.handlers.contains_key(endpoint) && !matches!(entry, HandlerEntry::Static) {
            return Err(Fault::DuplicateEndpoint(endpoint.to_owned()));
        }
        self.urls.insert(path, endpoint.to_owned()).map_err(|e| match e {
            matchit::InsertError::Conflict { .. } => Fault::DuplicatePath(path.to_owned()),
            other => Fault::InvalidRoute { path: path.to_owned(), reason: other.to_string() },
        })?;
        self.paths.insert(path.to_owned());
        self.handlers.insert(endpoint.to_owned(), entry);
        Ok(())
    }

    /// Installs the reserved static endpoint. Idempotent; no URL entry is
    /// created — static paths are recognised by prefix in [`Router::resolve`].
    pub(crate) fn seed_static(&mut self) {
        self.handlers.insert(STATIC_ENDPOINT.to_owned(), HandlerEntry::Static);
    }

    /// Resolves a request path to an endpoint.
    ///
    /// Paths under `/<static_folder>/` resolve to the reserved static
    /// endpoint, carrying the filesystem-relative remainder. Anything else
    /// goes through the URL table; a miss is [`Fault::NotFound`].
    pub fn resolve(&self, path: &str) -> Result<Resolution, Fault> {
        let static_prefix = format!("/{}/", self.static_folder);
        if path.starts_with(&static_prefix) {
            return Ok(Resolution {
                endpoint: STATIC_ENDPOINT.to_owned(),
                params: HashMap::new(),
                static_path: Some(path[1..].to_owned()),
            });
        }
        let matched = self.urls.at(path).map_err(|_| Fault::NotFound)?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Ok(Resolution {
            endpoint: matched.value.clone(),
            params,
            static_path: None,
        })
    }

    pub(crate) fn entry(&self, endpoint: &str) -> Option<&HandlerEntry> {
        self.handlers.get(endpoint)
    }
}
