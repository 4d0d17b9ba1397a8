//! Class-based views.
//!
//! A view is one type handling several HTTP methods on one URL: implement the
//! operations you support and list them in [`View::methods`]. Dispatch is a
//! static match from the method enum to the operation — there is no name-based
//! reflection to go wrong at runtime.

use async_trait::async_trait;

use crate::error::Fault;
use crate::method::Method;
use crate::request::Request;
use crate::response::Reply;

/// Fragment returned when a view receives a method outside its list.
///
/// A soft failure by contract: unlike a function route, a view answers an
/// unsupported method with this body and status 200, not with a fault.
pub const UNSUPPORTED_METHOD: &str = "<h1>Unknown or unsupported request method.</h1>";

/// A handler type dispatching on the HTTP method.
///
/// ```rust
/// use async_trait::async_trait;
/// use kado::{Fault, Reply, Request, View};
///
/// struct Hello;
///
/// #[async_trait]
/// impl View for Hello {
///     async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
///         Ok("<h1>hello</h1>".into())
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// The methods this view answers. Defaults to GET and POST.
    fn methods(&self) -> &[Method] {
        &[Method::Get, Method::Post]
    }

    async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok(Reply::Fragment(String::new()))
    }

    async fn post(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok(Reply::Fragment(String::new()))
    }

    async fn put(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok(Reply::Fragment(String::new()))
    }

    async fn delete(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok(Reply::Fragment(String::new()))
    }

    /// Entry point: routes the request's method to the same-named operation.
    ///
    /// Methods outside [`View::methods`] — and methods with no operation here —
    /// answer with [`UNSUPPORTED_METHOD`] rather than a fault.
    async fn dispatch(&self, req: &Request) -> Result<Reply, Fault> {
        if !self.methods().contains(&req.method()) {
            return Ok(Reply::Fragment(UNSUPPORTED_METHOD.to_owned()));
        }
        match req.method() {
            Method::Get => self.get(req).await,
            Method::Post => self.post(req).await,
            Method::Put => self.put(req).await,
            Method::Delete => self.delete(req).await,
            _ => Ok(Reply::Fragment(UNSUPPORTED_METHOD.to_owned())),
        }
    }
}
