//! Session guards: authentication wrappers around views.
//!
//! A guard composes explicitly — [`Guarded`] wraps any [`View`] and consults a
//! [`GuardPolicy`] before delegating to the wrapped entry point. When the
//! policy rejects, its reply (typically a redirect) goes out instead and the
//! view never runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Fault;
use crate::method::Method;
use crate::request::Request;
use crate::response::{Reply, Response};
use crate::session::SessionStore;
use crate::view::View;

/// Decides whether a request may reach the guarded view, and what to answer
/// when it may not.
pub trait GuardPolicy: Send + Sync {
    /// The authentication predicate.
    fn allows(&self, req: &Request) -> bool;

    /// The reply sent when [`GuardPolicy::allows`] fails.
    fn deny(&self, req: &Request) -> Reply;
}

/// A view wrapped by a guard policy.
pub struct Guarded<V> {
    view: V,
    policy: Arc<dyn GuardPolicy>,
}

impl<V: View> Guarded<V> {
    pub fn new(view: V, policy: impl GuardPolicy + 'static) -> Self {
        Self { view, policy: Arc::new(policy) }
    }
}

#[async_trait]
impl<V: View> View for Guarded<V> {
    fn methods(&self) -> &[Method] {
        self.view.methods()
    }

    async fn dispatch(&self, req: &Request) -> Result<Reply, Fault> {
        if self.policy.allows(req) {
            self.view.dispatch(req).await
        } else {
            Ok(self.policy.deny(req))
        }
    }
}

/// The stock policy: the request's session must hold a named key; otherwise
/// redirect.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use kado::{Guarded, SessionKeyGuard, SessionStore, View};
/// # struct Index;
/// # impl View for Index {}
/// # let sessions = Arc::new(SessionStore::open("session").unwrap());
/// let index = Guarded::new(Index, SessionKeyGuard::new(sessions, "user", "/login"));
/// ```
pub struct SessionKeyGuard {
    sessions: Arc<SessionStore>,
    key: String,
    redirect_to: String,
}

impl SessionKeyGuard {
    pub fn new(sessions: Arc<SessionStore>, key: &str, redirect_to: &str) -> Self {
        Self { sessions, key: key.to_owned(), redirect_to: redirect_to.to_owned() }
    }
}

impl GuardPolicy for SessionKeyGuard {
    fn allows(&self, req: &Request) -> bool {
        self.sessions.get(req.session_id()).contains_key(&self.key)
    }

    fn deny(&self, _req: &Request) -> Reply {
        Reply::Full(Response::redirect(&self.redirect_to))
    }
}
