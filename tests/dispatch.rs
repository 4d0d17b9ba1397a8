//! End-to-end dispatch: routing, method gating, session cookies, the error
//! boundary, and reply normalization — all through `Dispatcher::handle`.

use std::sync::Arc;

use kado::{App, AppConfig, Dispatcher, Method, Request, Response};
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

fn hello_app() -> (Dispatcher, TempDir) {
    let (mut app, dir) = app();
    app.route("/hello", &[Method::Get], "hello", |_req: Request| async {
        Ok("<h1>hello</h1>")
    })
    .unwrap();
    (app.into_dispatcher().unwrap(), dir)
}

#[tokio::test]
async fn unregistered_path_renders_the_mapped_404() {
    let (dispatcher, _dir) = hello_app();
    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/missing").build())
        .await;
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.body(), b"<h1>404 Source Not Found.</h1>");
}

#[tokio::test]
async fn route_method_outside_allow_list_renders_401() {
    let (dispatcher, _dir) = hello_app();
    let resp = dispatcher
        .handle(Request::builder(Method::Post, "/hello").build())
        .await;
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.body(), b"<h1>401 Unknown or unsupported method.</h1>");
}

#[tokio::test]
async fn fragment_replies_are_wrapped_as_html() {
    let (dispatcher, _dir) = hello_app();
    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/hello").build())
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), b"<h1>hello</h1>");
    assert_eq!(resp.header("content-type"), Some("text/html; charset=UTF-8"));
    assert!(resp.header("server").is_some());
}

#[tokio::test]
async fn first_response_issues_a_session_cookie() {
    let (dispatcher, _dir) = hello_app();
    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/hello").build())
        .await;
    let cookie = resp.header("set-cookie").expect("cookie issued");
    assert!(cookie.starts_with("session_id="));
    assert!(cookie.len() > "session_id=".len());
}

#[tokio::test]
async fn established_clients_are_not_reissued_a_cookie() {
    let (dispatcher, _dir) = hello_app();
    let resp = dispatcher
        .handle(
            Request::builder(Method::Get, "/hello")
                .cookie("session_id", "existing")
                .build(),
        )
        .await;
    assert!(resp.header("set-cookie").is_none());
}

#[tokio::test]
async fn full_responses_pass_through_untouched() {
    let (mut app, _dir) = app();
    app.route("/raw", &[Method::Get], "raw", |_req: Request| async {
        Ok(Response::text("plain"))
    })
    .unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/raw").build())
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("content-type"), Some("text/plain; charset=UTF-8"));
    // Staged headers attach to wrapped fragments only.
    assert!(resp.header("server").is_none());
    assert!(resp.header("set-cookie").is_none());
}

#[tokio::test]
async fn bare_routes_run_without_the_request() {
    let (mut app, _dir) = app();
    app.route_bare("/ping", &[Method::Get], "ping", || async { Ok("pong") })
        .unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/ping").build())
        .await;
    assert_eq!(resp.body(), b"pong");
}

#[tokio::test]
async fn empty_method_list_defaults_to_get_only() {
    let (mut app, _dir) = app();
    app.route("/d", &[], "d", |_req: Request| async { Ok("ok") })
        .unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let ok = dispatcher.handle(Request::builder(Method::Get, "/d").build()).await;
    assert_eq!(ok.status(), 200);
    let gated = dispatcher.handle(Request::builder(Method::Post, "/d").build()).await;
    assert_eq!(gated.status(), 401);
}

#[tokio::test]
async fn missing_static_asset_renders_the_code_2_entry_as_500() {
    let (app, _dir) = app();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/static/nope.css").build())
        .await;
    assert_eq!(resp.status(), 500);
    assert_eq!(resp.body(), b"<h1>E2 Not Found File</h1>");
}

#[tokio::test]
async fn rebound_error_renderer_replaces_the_canned_entry() {
    let (mut app, _dir) = app();
    app.errors_mut().rebind(404, || {
        ("<h1>custom 404</h1>".into(), "text/html; charset=UTF-8".into(), 404)
    });
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/missing").build())
        .await;
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.body(), b"<h1>custom 404</h1>");
}

#[tokio::test]
async fn handlers_see_path_parameters() {
    let (mut app, _dir) = app();
    app.route("/users/{id}", &[Method::Get], "user", |req: Request| async move {
        let id = req.param("id").unwrap_or("?").to_owned();
        Ok(format!("<p>{id}</p>"))
    })
    .unwrap();
    let dispatcher = app.into_dispatcher().unwrap();

    let resp = dispatcher
        .handle(Request::builder(Method::Get, "/users/42").build())
        .await;
    assert_eq!(resp.body(), b"<p>42</p>");
}

#[tokio::test]
async fn duplicate_registrations_are_refused() {
    let (mut app, _dir) = app();
    app.route("/a", &[Method::Get], "a", |_req: Request| async { Ok("") })
        .unwrap();

    let dup_path = app
        .route("/a", &[Method::Get], "b", |_req: Request| async { Ok("") })
        .err()
        .unwrap();
    assert_eq!(dup_path, kado::Fault::DuplicatePath("/a".to_owned()));

    let dup_endpoint = app
        .route("/b", &[Method::Get], "a", |_req: Request| async { Ok("") })
        .err()
        .unwrap();
    assert_eq!(dup_endpoint, kado::Fault::DuplicateEndpoint("a".to_owned()));
}

#[tokio::test]
async fn handlers_share_the_dispatcher_session_store() {
    let (mut app, _dir) = app();
    let sessions = app.sessions();
    app.route("/whoami", &[Method::Get], "whoami", move |req: Request| {
        let sessions = Arc::clone(&sessions);
        async move {
            let user = sessions
                .get_item(req.session_id(), "user")
                .and_then(|v| v.as_str().map(str::to_owned))
                .unwrap_or_else(|| "anonymous".to_owned());
            Ok(format!("<p>{user}</p>"))
        }
    })
    .unwrap();

    let sessions = app.sessions();
    sessions.push("sid-1", "user", json!("alice"));
    let dispatcher = app.into_dispatcher().unwrap();

    let known = dispatcher
        .handle(
            Request::builder(Method::Get, "/whoami")
                .cookie("session_id", "sid-1")
                .build(),
        )
        .await;
    assert_eq!(known.body(), b"<p>alice</p>");

    let anonymous = dispatcher
        .handle(Request::builder(Method::Get, "/whoami").build())
        .await;
    assert_eq!(anonymous.body(), b"<p>anonymous</p>");
}
