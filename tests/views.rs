//! Class-based views, controllers, and session guards through the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use kado::{
    App, AppConfig, Controller, Fault, Guarded, Method, Reply, Request, Response,
    SessionKeyGuard, SessionStore, View,
};
use serde_json::json;
use tempfile::TempDir;

fn app() -> (App, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        session_dir: dir.path().join("session"),
        ..AppConfig::default()
    };
    (App::new(config).unwrap(), dir)
}

struct Pages;

#[async_trait]
impl View for Pages {
    async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok("<p>got</p>".into())
    }

    async fn post(&self, req: &Request) -> Result<Reply, Fault> {
        let who = req.form("user").unwrap_or("nobody").to_owned();
        Ok(format!("<p>posted {who}</p>").into())
    }
}

struct Profile {
    sessions: Arc<SessionStore>,
}

#[async_trait]
impl View for Profile {
    fn methods(&self) -> &[Method] {
        &[Method::Get]
    }

    async fn get(&self, req: &Request) -> Result<Reply, Fault> {
        let user = self
            .sessions
            .get_item(req.session_id(), "user")
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        Ok(format!("<p>{user}</p>").into())
    }
}

#[tokio::test]
async fn views_route_each_method_to_its_operation() {
    let (mut app, _dir) = app();
    app.bind_view("/pages", Arc::new(Pages), "pages").unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let got = dispatcher
        .handle(Request::builder(Method::Get, "/pages").build())
        .await;
    assert_eq!(got.body(), b"<p>got</p>");

    let posted = dispatcher
        .handle(
            Request::builder(Method::Post, "/pages")
                .form("user", "alice")
                .build(),
        )
        .await;
    assert_eq!(posted.body(), b"<p>posted alice</p>");
}

#[tokio::test]
async fn unsupported_view_method_is_a_soft_fragment_not_a_fault() {
    let (mut app, _dir) = app();
    app.bind_view("/pages", Arc::new(Pages), "pages").unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Put, "/pages").build())
        .await;
    // Softer than the function-route path: status 200 with the fixed body.
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), kado::UNSUPPORTED_METHOD.as_bytes());
}

#[tokio::test]
async fn controllers_register_rules_under_their_namespace() {
    let (mut app, _dir) = app();
    let controller = Controller::new("site")
        .rule("/pages", Arc::new(Pages), "pages")
        .rule("/about", Arc::new(Pages), "about");
    app.load_controller(controller).unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/about").build())
        .await;
    assert_eq!(resp.body(), b"<p>got</p>");
}

#[tokio::test]
async fn namespacing_keeps_same_named_views_apart() {
    let (mut app, _dir) = app();
    app.load_controller(Controller::new("a").rule("/a", Arc::new(Pages), "detail"))
        .unwrap();
    // Same short endpoint, different namespace: no collision.
    app.load_controller(Controller::new("b").rule("/b", Arc::new(Pages), "detail"))
        .unwrap();

    // Same namespace and short endpoint: refused.
    let err = app
        .load_controller(Controller::new("a").rule("/c", Arc::new(Pages), "detail"))
        .err()
        .unwrap();
    assert_eq!(err, Fault::DuplicateEndpoint("a.detail".to_owned()));
}

#[tokio::test]
async fn guard_redirects_when_the_session_lacks_the_key() {
    let (mut app, _dir) = app();
    let sessions = app.sessions();
    let profile = Guarded::new(
        Profile { sessions: Arc::clone(&sessions) },
        SessionKeyGuard::new(Arc::clone(&sessions), "user", "/login"),
    );
    app.bind_view("/profile", Arc::new(profile), "profile").unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(
            Request::builder(Method::Get, "/profile")
                .cookie("session_id", "sid-unknown")
                .build(),
        )
        .await;
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.header("location"), Some("/login"));
}

#[tokio::test]
async fn guard_delegates_when_the_session_holds_the_key() {
    let (mut app, _dir) = app();
    let sessions = app.sessions();
    sessions.push("sid-1", "user", json!("alice"));
    let profile = Guarded::new(
        Profile { sessions: Arc::clone(&sessions) },
        SessionKeyGuard::new(Arc::clone(&sessions), "user", "/login"),
    );
    app.bind_view("/profile", Arc::new(profile), "profile").unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(
            Request::builder(Method::Get, "/profile")
                .cookie("session_id", "sid-1")
                .build(),
        )
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), b"<p>alice</p>");
}

#[tokio::test]
async fn views_may_return_full_responses() {
    struct Raw;

    #[async_trait]
    impl View for Raw {
        async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
            Ok(Response::redirect("/elsewhere").into())
        }
    }

    let (mut app, _dir) = app();
    app.bind_view("/raw", Arc::new(Raw), "raw").unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/raw").build())
        .await;
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.header("location"), Some("/elsewhere"));
}
