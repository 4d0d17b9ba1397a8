//! Application assembly: configuration, registration, and startup.
//!
//! An [`App`] collects routes, views and controllers, then finalises into a
//! read-only [`Dispatcher`] — seeding the reserved static endpoint and loading
//! persisted sessions on the way. Registration is fallible (duplicate paths
//! and endpoints are refused); serving never mutates the tables again.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::controller::Controller;
use crate::dispatch::Dispatcher;
use crate::error::{Error, ErrorMap, Fault};
use crate::handler::{HandlerEntry, RouteFn};
use crate::method::Method;
use crate::request::Request;
use crate::response::Reply;
use crate::router::Router;
use crate::server::Server;
use crate::session::SessionStore;
use crate::view::View;

/// Application configuration, by value. No config files, no environment
/// scraping — construct it, override what you need, hand it to [`App::new`].
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory name whose URL prefix is served as static assets.
    pub static_folder: String,
    /// Directory the template engine reads from.
    pub template_folder: PathBuf,
    /// Directory session files persist under.
    pub session_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            static_folder: "static".to_owned(),
            template_folder: PathBuf::from("templates"),
            session_dir: PathBuf::from("session"),
        }
    }
}

/// The application under assembly.
pub struct App {
    config: AppConfig,
    router: Router,
    sessions: Arc<SessionStore>,
    errors: ErrorMap,
}

impl App {
    /// Creates an app, opening (and if needed creating) the session directory.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let sessions = Arc::new(SessionStore::open(&config.session_dir)?);
        let router = Router::new(&config.static_folder);
        Ok(Self { config, router, sessions, errors: ErrorMap::defaults() })
    }

    /// The shared session store, for wiring into views and guards.
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The error table, for rebinding renderers before serving.
    pub fn errors_mut(&mut self) -> &mut ErrorMap {
        &mut self.errors
    }

    /// Registers a function route that receives the request.
    ///
    /// An empty `methods` slice means GET only.
    pub fn route<F, Fut, R>(
        &mut self,
        path: &str,
        methods: &[Method],
        endpoint: &str,
        f: F,
    ) -> Result<&mut Self, Fault>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Fault>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.add_route(path, methods, endpoint, RouteFn::of(f))
    }

    /// Registers a function route that takes no arguments.
    pub fn route_bare<F, Fut, R>(
        &mut self,
        path: &str,
        methods: &[Method],
        endpoint: &str,
        f: F,
    ) -> Result<&mut Self, Fault>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Fault>> + Send + 'static,
        R: Into<Reply> + Send + 'static,
    {
        self.add_route(path, methods, endpoint, RouteFn::bare(f))
    }

    fn add_route(
        &mut self,
        path: &str,
        methods: &[Method],
        endpoint: &str,
        f: RouteFn,
    ) -> Result<&mut Self, Fault> {
        let methods = if methods.is_empty() { vec![Method::Get] } else { methods.to_vec() };
        self.router.register(path, endpoint, HandlerEntry::Route { f, methods })?;
        Ok(self)
    }

    /// Registers a class-based view at `url` under `endpoint`.
    pub fn bind_view(
        &mut self,
        url: &str,
        view: Arc<dyn View>,
        endpoint: &str,
    ) -> Result<&mut Self, Fault> {
        self.router.register(url, endpoint, HandlerEntry::View(view))?;
        Ok(self)
    }

    /// Registers every rule of `controller` under `name.short-endpoint`.
    pub fn load_controller(&mut self, controller: Controller) -> Result<&mut Self, Fault> {
        for rule in controller.rules {
            let endpoint = format!("{}.{}", controller.name, rule.endpoint);
            self.router.register(&rule.url, &endpoint, HandlerEntry::View(rule.view))?;
        }
        Ok(self)
    }

    /// Finalises the app: seeds the reserved static endpoint, loads persisted
    /// sessions, and returns the read-only dispatcher.
    pub fn into_dispatcher(mut self) -> Result<Dispatcher, Error> {
        self.router.seed_static();
        self.sessions.load_all()?;
        Ok(Dispatcher::new(self.router, self.sessions, self.errors))
    }

    /// Finalises and serves on the configured host and port until shutdown.
    pub async fn run(self) -> Result<(), Error> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!(%addr, "starting");
        let dispatcher = self.into_dispatcher()?;
        Server::bind(&addr).serve(dispatcher).await
    }
}
