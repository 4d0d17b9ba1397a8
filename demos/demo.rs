//! Demo application: login, logout, register, a JSON API and a file download,
//! backed by an in-memory user table behind the [`kado::db::Database`] trait.
//!
//! Run from the repository root with:
//!   RUST_LOG=info cargo run --example demo
//!
//! Try:
//!   curl -v http://127.0.0.1:8080/
//!   curl -v http://127.0.0.1:8080/login
//!   curl -v -X POST http://127.0.0.1:8080/register -d 'user=alice'
//!   curl -v http://127.0.0.1:8080/api
//!   curl -v http://127.0.0.1:8080/demos/static/style.css

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kado::db::{Database, DbResult};
use kado::{
    App, AppConfig, Controller, Fault, Guarded, Reply, Request, Response, SessionKeyGuard,
    SessionStore, View, assets, templates,
};
use serde_json::json;

// ── In-memory user table ──────────────────────────────────────────────────────

/// A stand-in for a real SQL client: one `user` table with unique names.
/// It understands exactly the two statements the demo views issue.
struct MemoryDb {
    users: Mutex<Vec<String>>,
}

impl MemoryDb {
    fn new() -> Self {
        Self { users: Mutex::new(Vec::new()) }
    }
}

fn quoted(sql: &str) -> Option<&str> {
    let start = sql.find('\'')? + 1;
    let end = sql[start..].find('\'')? + start;
    Some(&sql[start..end])
}

impl Database for MemoryDb {
    fn execute(&self, sql: &str) -> DbResult {
        let Some(name) = quoted(sql) else {
            return DbResult {
                error_info: Some(format!("unsupported statement: {sql}")),
                ..DbResult::default()
            };
        };
        let users = self.users.lock().unwrap();
        let result: Vec<_> = users
            .iter()
            .enumerate()
            .filter(|(_, user)| user.as_str() == name)
            .map(|(id, user)| {
                let mut row = serde_json::Map::new();
                row.insert("id".to_owned(), json!(id as u64 + 1));
                row.insert("f_name".to_owned(), json!(user));
                row
            })
            .collect();
        DbResult { success: true, rows: result.len() as u64, result, ..DbResult::default() }
    }

    fn insert(&self, sql: &str) -> DbResult {
        let Some(name) = quoted(sql) else {
            return DbResult {
                error_info: Some(format!("unsupported statement: {sql}")),
                ..DbResult::default()
            };
        };
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|user| user == name) {
            return DbResult {
                error_info: Some(format!("duplicate user name `{name}`")),
                ..DbResult::default()
            };
        }
        users.push(name.to_owned());
        DbResult {
            success: true,
            rows: 1,
            last_insert_id: Some(users.len() as u64),
            ..DbResult::default()
        }
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

struct Index {
    sessions: Arc<SessionStore>,
    tpl: PathBuf,
}

#[async_trait]
impl View for Index {
    async fn get(&self, req: &Request) -> Result<Reply, Fault> {
        let user = self
            .sessions
            .get_item(req.session_id(), "user")
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        let body = templates::render(
            &self.tpl,
            "index.html",
            &templates::vars([("user", user.as_str()), ("message", "welcome back")]),
        );
        Ok(body.into())
    }
}

struct Login {
    sessions: Arc<SessionStore>,
    db: Arc<dyn Database>,
    tpl: PathBuf,
}

#[async_trait]
impl View for Login {
    async fn get(&self, req: &Request) -> Result<Reply, Fault> {
        let state = req.arg("state").unwrap_or("1");
        let message = if state == "1" { "enter your user name" } else { "no such user" };
        let body = templates::render(
            &self.tpl,
            "layout.html",
            &templates::vars([("title", "login"), ("message", message)]),
        );
        Ok(body.into())
    }

    async fn post(&self, req: &Request) -> Result<Reply, Fault> {
        let user = req.form("user").unwrap_or_default();
        let ret = self.db.execute(&format!("SELECT * FROM user WHERE f_name = '{user}'"));
        if ret.rows == 1 {
            if let Some(name) = ret.first().and_then(|row| row.get("f_name")) {
                self.sessions.push(req.session_id(), "user", name.clone());
            }
            return Ok(Response::redirect("/").into());
        }
        Ok(Response::redirect("/login?state=0").into())
    }
}

struct Logout {
    sessions: Arc<SessionStore>,
}

#[async_trait]
impl View for Logout {
    async fn get(&self, req: &Request) -> Result<Reply, Fault> {
        self.sessions.pop(req.session_id(), "user");
        Ok(Response::redirect("/").into())
    }
}

struct Api;

#[async_trait]
impl View for Api {
    async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
        let data = json!({
            "name": "kado",
            "kind": "demo",
            "endpoints": ["/", "/login", "/logout", "/api", "/download", "/register"],
        });
        Ok(Response::json(&data).into())
    }
}

struct Download;

#[async_trait]
impl View for Download {
    async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
        Ok(assets::send_file(Path::new("README.md"), None)?.into())
    }
}

struct Register {
    db: Arc<dyn Database>,
    tpl: PathBuf,
}

#[async_trait]
impl View for Register {
    async fn get(&self, _req: &Request) -> Result<Reply, Fault> {
        let body = templates::render(
            &self.tpl,
            "layout.html",
            &templates::vars([("title", "register"), ("message", "pick a user name")]),
        );
        Ok(body.into())
    }

    async fn post(&self, req: &Request) -> Result<Reply, Fault> {
        let user = req.form("user").unwrap_or_default();
        let ret = self.db.insert(&format!("INSERT INTO user(f_name) VALUE('{user}')"));
        if ret.success {
            return Ok(Response::redirect("/login").into());
        }
        Ok(Response::json(&ret.to_value()).into())
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = AppConfig {
        static_folder: "demos/static".to_owned(),
        template_folder: PathBuf::from("demos/templates"),
        session_dir: PathBuf::from("demos/session"),
        ..AppConfig::default()
    };
    let mut app = App::new(config)?;

    let sessions = app.sessions();
    let db: Arc<dyn Database> = Arc::new(MemoryDb::new());
    let tpl = app.config().template_folder.clone();

    let index = Guarded::new(
        Index { sessions: Arc::clone(&sessions), tpl: tpl.clone() },
        SessionKeyGuard::new(Arc::clone(&sessions), "user", "/login"),
    );
    let logout = Guarded::new(
        Logout { sessions: Arc::clone(&sessions) },
        SessionKeyGuard::new(Arc::clone(&sessions), "user", "/login"),
    );

    let controller = Controller::new("index")
        .rule("/", Arc::new(index), "index")
        .rule(
            "/login",
            Arc::new(Login { sessions: Arc::clone(&sessions), db: Arc::clone(&db), tpl: tpl.clone() }),
            "login",
        )
        .rule("/logout", Arc::new(logout), "logout")
        .rule("/api", Arc::new(Api), "api")
        .rule("/download", Arc::new(Download), "download")
        .rule("/register", Arc::new(Register { db, tpl }), "register");
    app.load_controller(controller)?;

    // Reskin the stock 404 page.
    app.errors_mut().rebind(404, || {
        (
            "<h1>404 — nothing lives here</h1>".to_owned(),
            "text/html; charset=UTF-8".to_owned(),
            404,
        )
    });

    app.run().await?;
    Ok(())
}
