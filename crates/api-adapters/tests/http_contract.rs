//! Router-level contract: status codes, error envelope and auth rejections,
//! with every port mocked.

use std::sync::Arc;

use api_adapters::{router, AppState, HttpConfig};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::errors::DomainError;
use domains::models::{RankingKind, User};
use domains::ports::{
    MockCredentialHasher, MockLikeRepository, MockListRepository, MockMediaStorage, MockRankingRepository,
    MockRatingRepository, MockReviewRepository, MockTokenService, MockUserRepository, MockWatchlistRepository,
};
use mockall::predicate::eq;
use serde_json::Value;
use services::{Repositories, Services};
use tower::ServiceExt;

#[derive(Default)]
struct Mocks {
    users: MockUserRepository,
    ratings: MockRatingRepository,
    rankings: MockRankingRepository,
    tokens: MockTokenService,
}

fn user(id: i64) -> User {
    User {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        password_hash: "hash".to_owned(),
        profile_picture: None,
        slogan: None,
        created_at: Utc::now(),
    }
}

fn app(mocks: Mocks) -> Router {
    let repos = Repositories {
        users: Arc::new(mocks.users),
        ratings: Arc::new(mocks.ratings),
        likes: Arc::new(MockLikeRepository::new()),
        watchlist: Arc::new(MockWatchlistRepository::new()),
        reviews: Arc::new(MockReviewRepository::new()),
        rankings: Arc::new(mocks.rankings),
        lists: Arc::new(MockListRepository::new()),
    };
    let services = Services::new(
        repos,
        Arc::new(MockCredentialHasher::new()),
        Arc::new(mocks.tokens),
        Arc::new(MockMediaStorage::new()),
    );
    router(AppState::new(services), &HttpConfig::default())
}

/// Token "good" belongs to user 7, who exists.
fn signed_in() -> Mocks {
    let mut mocks = Mocks::default();
    mocks
        .tokens
        .expect_verify()
        .with(eq("good"))
        .returning(|_| Ok(7));
    mocks
        .users
        .expect_find_user()
        .with(eq(7))
        .returning(|id| Ok(Some(user(id))));
    mocks
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (status, body) = send(app(Mocks::default()), get("/healthz", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = app(Mocks::default()).oneshot(get("/healthz", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn missing_token_is_401_with_error_envelope() {
    let (status, body) = send(app(Mocks::default()), get("/api/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_bearer_authorization_counts_as_missing() {
    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwdw==")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(Mocks::default()), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_is_403() {
    let mut mocks = Mocks::default();
    mocks
        .tokens
        .expect_verify()
        .returning(|_| Err(DomainError::Unauthorized("invalid or expired token".into())));
    let (status, body) = send(app(mocks), get("/api/users/me", Some("forged"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn token_of_deleted_account_is_401() {
    let mut mocks = Mocks::default();
    mocks.tokens.expect_verify().returning(|_| Ok(9));
    mocks.users.expect_find_user().returning(|_| Ok(None));
    let (status, _) = send(app(mocks), get("/api/users/me", Some("stale"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_user_without_password_hash() {
    let (status, body) = send(app(signed_in()), get("/api/users/me", Some("good"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["username"], "user7");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn out_of_range_score_is_400_without_touching_storage() {
    let request = json_request(
        "POST",
        "/api/media/550/rate",
        Some("good"),
        r#"{"score": 5.5, "mediaType": "movie"}"#,
    );
    let (status, body) = send(app(signed_in()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("score"));
}

#[tokio::test]
async fn unknown_media_type_is_400() {
    let request = json_request(
        "POST",
        "/api/media/550/rate",
        Some("good"),
        r#"{"score": 4.0, "mediaType": "podcast"}"#,
    );
    let (status, _) = send(app(signed_in()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_with_error_envelope() {
    let request = json_request("POST", "/login", None, "{not json");
    let (status, body) = send(app(Mocks::default()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_rating_is_404() {
    let mut mocks = signed_in();
    mocks.ratings.expect_find_rating().returning(|_, _| Ok(None));
    let (status, body) = send(app(mocks), get("/api/media/550/rating?mediaType=movie", Some("good"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn rating_lookup_requires_media_type() {
    let (status, body) = send(app(signed_in()), get("/api/media/550/rating", Some("good"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mediaType"));
}

#[tokio::test]
async fn eleven_ranked_items_are_rejected() {
    let items: Vec<String> = (1..=11).map(|id| format!(r#"{{"id": {id}}}"#)).collect();
    let body = format!(r#"{{"items": [{}]}}"#, items.join(","));
    let request = json_request("POST", "/api/users/top-movies", Some("good"), &body);
    let (status, _) = send(app(signed_in()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ranking_routes_carry_their_kind() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_user().returning(|id| Ok(Some(user(id))));
    mocks
        .rankings
        .expect_ranking_for_user()
        .with(eq(3), eq(RankingKind::Directors))
        .returning(|_, _| Ok(Vec::new()));
    let (status, body) = send(app(mocks), get("/api/users/3/top-directors", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(Vec::new()));
}

#[tokio::test]
async fn storage_failure_is_500_with_generic_message() {
    let mut mocks = Mocks::default();
    mocks.users.expect_find_user().returning(|id| Ok(Some(user(id))));
    mocks
        .rankings
        .expect_ranking_for_user()
        .returning(|_, _| Err(DomainError::Internal("connection reset".into())));
    let (status, body) = send(app(mocks), get("/api/users/3/top-actors", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn non_numeric_path_id_is_400() {
    let (status, _) = send(app(Mocks::default()), get("/api/users/abc/top-movies", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_count_routed_requests() {
    let app = app(Mocks::default());
    let _ = app.clone().oneshot(get("/healthz", None)).await.unwrap();

    let response = app.oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("reelshelf_http_requests"));
    assert!(text.contains("route=\"/healthz\""));
}
