//! # integration-tests
//!
//! Harness shared by the `tests/` suites: the real router over the
//! in-memory store, real Argon2 hashing with cheap parameters, real JWTs
//! and avatar storage in a temporary directory.

use std::sync::Arc;

use api_adapters::{router, AppState, HttpConfig};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use serde_json::Value;
use services::{Repositories, Services};
use storage_adapters::{LocalMediaStore, MemoryStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";
pub const JWT_SECRET: &[u8] = b"integration-secret-integration-secret";
pub const UPLOAD_PREFIX: &str = "/uploads";

/// A response with its body decoded as JSON (`Null` when empty).
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

/// A registered account and its bearer token.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub token: String,
}

pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(
            Repositories::from_store(store.clone()),
            Arc::new(Argon2Hasher::new(1024, 1, 1).expect("argon2 params")),
            Arc::new(JwtTokenService::new(JWT_SECRET, chrono::Duration::days(1))),
            Arc::new(LocalMediaStore::new(uploads.path(), UPLOAD_PREFIX)),
        );
        let config = HttpConfig {
            upload_dir: uploads.path().to_path_buf(),
            url_prefix: UPLOAD_PREFIX.to_owned(),
            ..HttpConfig::default()
        };
        Self {
            router: router(AppState::new(services), &config),
            store,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Reply {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Reply {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    /// Registers a fresh account with a random name and logs it in.
    pub async fn account(&self) -> Account {
        let base: String = Username().fake();
        let cleaned: String = base.chars().filter(char::is_ascii_alphanumeric).take(20).collect();
        let username = format!("{cleaned}_{}", (1000..9999).fake::<u32>());
        let email: String = SafeEmail().fake();
        self.account_named(&username, &email).await
    }

    pub async fn account_named(&self, username: &str, email: &str) -> Account {
        let registered = self
            .post(
                "/register",
                None,
                serde_json::json!({ "username": username, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "register: {:?}", registered.body);

        let login = self
            .post("/login", None, serde_json::json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(login.status, StatusCode::OK, "login: {:?}", login.body);

        Account {
            id: login.body["user"]["id"].as_i64().expect("user id"),
            username: username.to_owned(),
            email: email.to_lowercase(),
            token: login.body["token"].as_str().expect("token").to_owned(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}
