//! # kado
//!
//! A small web-application framework: routed handlers, class-based views,
//! file-backed sessions. Nothing more. Nothing less.
//!
//! ## The shape
//!
//! URL paths map to endpoints; endpoints map to one of three handler kinds —
//! function routes gated by a method allow-list, [`View`] types dispatching on
//! the HTTP method themselves, and a reserved static-file endpoint shared by
//! everything under the static folder. One dispatcher drives each request:
//! it resolves the session identity from the `session_id` cookie (issuing an
//! identifier on the first response), resolves the handler, and translates
//! every [`Fault`] into an HTTP response at a single boundary.
//!
//! Session data lives in a file-per-identifier store loaded once at startup.
//! Templates are plain `{{ name }}` substitution. TLS, rate limiting and
//! body-size limits belong to the reverse proxy in front.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kado::{App, AppConfig, Method, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new(AppConfig::default())?;
//!
//!     app.route("/hello", &[Method::Get], "hello", |req: Request| async move {
//!         let name = req.arg("name").unwrap_or("world").to_owned();
//!         Ok(format!("<h1>hello {name}</h1>"))
//!     })?;
//!
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! Class-based views, controllers and session guards build on the same core —
//! see [`View`], [`Controller`] and [`Guarded`].

mod app;
mod controller;
mod dispatch;
mod error;
mod guard;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod session;
mod view;

pub mod assets;
pub mod db;
pub mod templates;

pub use app::{App, AppConfig};
pub use controller::{Controller, ViewRule};
pub use dispatch::Dispatcher;
pub use error::{Error, ErrorMap, Fault};
pub use guard::{GuardPolicy, Guarded, SessionKeyGuard};
pub use handler::{HandlerEntry, RouteFn};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{Reply, Response, ResponseBuilder};
pub use router::{Resolution, Router, STATIC_ENDPOINT};
pub use server::Server;
pub use session::{SessionStore, create_session_id};
pub use view::{UNSUPPORTED_METHOD, View};
