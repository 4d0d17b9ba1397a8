//! Handler descriptors and route-callable type erasure.
//!
//! The router needs to hold handlers of *different* concrete types in one
//! endpoint table, so route functions are stored as trait objects behind
//! [`Arc`]: the concrete `async fn` is wrapped once at registration, and each
//! request pays one Arc clone plus one virtual call.
//!
//! A route function comes in two shapes, mirroring the two signatures the
//! framework accepts: one that receives the [`Request`] and one that takes no
//! arguments at all. The dispatcher picks the matching invocation, so a
//! handler that never looks at the request does not have to name it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Fault;
use crate::request::Request;
use crate::response::Reply;
use crate::view::View;

/// A heap-allocated, type-erased future resolving to a handler result.
///
/// `pub` rather than `pub(crate)` because it appears in the trait-object
/// signatures of [`RouteFn`]'s variants; external crates have no reason to
/// name it.
#[doc(hidden)]
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, Fault>> + Send>>;

/// A type-erased route function.
pub enum RouteFn {
    /// Invoked with the request.
    WithRequest(Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>),
    /// Invoked with no arguments.
    Bare(Arc<dyn Fn() -> HandlerFuture + Send + Sync>),
}

impl RouteFn {
    /// Wraps an `async fn(Request) -> Result<impl Into<Reply>, Fault>`.
    pub fn of<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Fault>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        Self::WithRequest(Arc::new(move |req| -> HandlerFuture {
            let fut = f(req);
            Box::pin(async move { fut.await.map(Into::into) })
        }))
    }

    /// Wraps an `async fn() -> Result<impl Into<Reply>, Fault>`.
    pub fn bare<F, Fut, R>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Fault>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        Self::Bare(Arc::new(move || -> HandlerFuture {
            let fut = f();
            Box::pin(async move { fut.await.map(Into::into) })
        }))
    }

    pub(crate) async fn invoke(&self, req: Request) -> Result<Reply, Fault> {
        match self {
            Self::WithRequest(f) => f(req).await,
            Self::Bare(f) => f().await,
        }
    }
}

/// What an endpoint name resolves to: the handler and its kind-specific
/// configuration.
pub enum HandlerEntry {
    /// A function route gated by an allow-list of methods.
    Route { f: RouteFn, methods: Vec<crate::method::Method> },
    /// A class-based view; method gating is the view's own business.
    View(Arc<dyn View>),
    /// The reserved static-file endpoint.
    Static,
}

impl HandlerEntry {
    /// The kind tag, for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Route { .. } => "route",
            Self::View(_) => "view",
            Self::Static => "static",
        }
    }
}
