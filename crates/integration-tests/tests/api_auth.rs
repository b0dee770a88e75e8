use axum::http::StatusCode;
use integration_tests::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_login_and_rate() {
    let app = TestApp::new();
    let registered = app
        .post(
            "/register",
            None,
            json!({ "username": "cinephile", "email": "Cine@Example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["user"]["username"], "cinephile");
    assert_eq!(registered.body["user"]["email"], "cine@example.com");
    assert!(registered.body["user"].get("passwordHash").is_none());

    let login = app
        .post("/login", None, json!({ "email": "cine@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["token"].as_str().unwrap().to_owned();

    let rated = app
        .post("/api/media/42/rate", Some(&token), json!({ "score": 4.5, "mediaType": "movie" }))
        .await;
    assert_eq!(rated.status, StatusCode::CREATED);
    assert_eq!(rated.body["mediaId"], 42);
    assert_eq!(rated.body["mediaType"], "movie");
    let read = app.get("/api/media/42/rating?mediaType=movie", Some(&token)).await;
    assert_eq!(read.body["score"], 4.5);

    let rerated = app
        .post("/api/media/42/rate", Some(&token), json!({ "score": 3.0, "mediaType": "movie" }))
        .await;
    assert_eq!(rerated.status, StatusCode::OK);
    assert_eq!(rerated.body["id"], rated.body["id"]);
    let read = app.get("/api/media/42/rating?mediaType=movie", Some(&token)).await;
    assert_eq!(read.body["score"], 3.0);
}

#[tokio::test]
async fn duplicate_username_differs_only_in_case() {
    let app = TestApp::new();
    app.account_named("Marty", "marty@example.com").await;

    let again = app
        .post(
            "/register",
            None,
            json!({ "username": "marty", "email": "other@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert!(again.body["error"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.account_named("first", "shared@example.com").await;

    let again = app
        .post(
            "/register",
            None,
            json!({ "username": "second", "email": "SHARED@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_input_is_validated() {
    let app = TestApp::new();
    let cases = [
        json!({ "username": "ab", "email": "a@example.com", "password": PASSWORD }),
        json!({ "username": "has space", "email": "a@example.com", "password": PASSWORD }),
        json!({ "username": "valid", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "valid", "email": "a@example.com", "password": "short" }),
        json!({ "email": "a@example.com", "password": PASSWORD }),
    ];
    for body in cases {
        let reply = app.post("/register", None, body.clone()).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "accepted {body}");
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::new();
    let account = app.account().await;

    let wrong = app
        .post("/login", None, json!({ "email": account.email, "password": "not the password" }))
        .await;
    let unknown = app
        .post("/login", None, json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;

    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn token_gates_protected_routes() {
    let app = TestApp::new();
    let account = app.account().await;

    assert_eq!(app.get("/api/users/me", None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/users/me", Some("garbage")).await.status, StatusCode::FORBIDDEN);

    let me = app.get("/api/users/me", Some(&account.token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], account.id);
}

#[tokio::test]
async fn deleted_account_token_stops_working() {
    let app = TestApp::new();
    let account = app.account().await;

    let deleted = app.delete("/api/users/me", Some(&account.token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let me = app.get("/api/users/me", Some(&account.token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let login = app
        .post("/login", None, json!({ "email": account.email, "password": PASSWORD }))
        .await;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_update_renames_and_clears_slogan() {
    let app = TestApp::new();
    let account = app.account().await;

    let updated = app
        .put(
            "/api/users/profile",
            Some(&account.token),
            json!({ "username": "renamed_user", "slogan": "Here's looking at you" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["username"], "renamed_user");
    assert_eq!(updated.body["slogan"], "Here's looking at you");

    let cleared = app
        .put("/api/users/profile", Some(&account.token), json!({ "slogan": "" }))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["slogan"].is_null());
    assert_eq!(cleared.body["username"], "renamed_user");
}

#[tokio::test]
async fn rename_onto_taken_username_is_rejected() {
    let app = TestApp::new();
    app.account_named("taken", "taken@example.com").await;
    let account = app.account().await;

    let reply = app
        .put("/api/users/profile", Some(&account.token), json!({ "username": "TAKEN" }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}
