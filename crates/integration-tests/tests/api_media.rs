use axum::http::StatusCode;
use integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn like_toggles_on_then_off() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());
    let body = json!({ "mediaType": "movie" });

    let first = app.post("/api/media/603/like", token, body.clone()).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["liked"], true);
    assert_eq!(app.get("/api/media/603/like-status?mediaType=movie", token).await.body["liked"], true);

    let second = app.post("/api/media/603/like", token, body).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["liked"], false);
    assert_eq!(app.get("/api/media/603/like-status?mediaType=movie", token).await.body["liked"], false);
}

#[tokio::test]
async fn same_id_with_other_media_type_is_a_different_item() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    app.post("/api/media/1399/like", token, json!({ "mediaType": "tv" })).await;

    assert_eq!(app.get("/api/media/1399/like-status?mediaType=tv", token).await.body["liked"], true);
    assert_eq!(app.get("/api/media/1399/like-status?mediaType=movie", token).await.body["liked"], false);
}

#[tokio::test]
async fn watchlist_toggles_on_then_off() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    let added = app.post("/api/media/13/watchlist", token, json!({ "mediaType": "movie" })).await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["inWatchlist"], true);
    let status = app.get("/api/media/13/watchlist-status?mediaType=movie", token).await;
    assert_eq!(status.body["inWatchlist"], true);

    let removed = app.post("/api/media/13/watchlist", token, json!({ "mediaType": "movie" })).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["inWatchlist"], false);
    assert!(app.get("/api/users/watchlist", token).await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rating_twice_updates_the_same_row() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    let first = app.post("/api/media/550/rate", token, json!({ "score": 3.0, "mediaType": "movie" })).await;
    assert_eq!(first.status, StatusCode::CREATED);
    let second = app.post("/api/media/550/rate", token, json!({ "score": 4.5, "mediaType": "movie" })).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["id"], second.body["id"]);
    assert_eq!(second.body["score"], 4.5);

    let ratings = app.get(&format!("/api/users/{}/ratings", a.id), None).await;
    assert_eq!(ratings.body.as_array().unwrap().len(), 1);
    assert_eq!(ratings.body[0]["score"], 4.5);
}

#[tokio::test]
async fn score_bounds_are_inclusive() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    for (media_id, score) in [(1, 0.5), (2, 5.0)] {
        let reply = app
            .post(&format!("/api/media/{media_id}/rate"), token, json!({ "score": score, "mediaType": "movie" }))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "rejected {score}");
    }
    for score in [0.4, 5.1, 0.0, -1.0] {
        let reply = app
            .post("/api/media/3/rate", token, json!({ "score": score, "mediaType": "movie" }))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "accepted {score}");
    }
    let missing = app.post("/api/media/3/rate", token, json!({ "mediaType": "movie" })).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

async fn watched(app: &TestApp, token: &str) -> serde_json::Value {
    app.get("/api/media/77/watched-status?mediaType=movie", Some(token))
        .await
        .body["watched"]
        .clone()
}

#[tokio::test]
async fn watched_means_rated() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());
    assert_eq!(watched(&app, &a.token).await, false);
    app.post("/api/media/77/rate", token, json!({ "score": 2.5, "mediaType": "movie" })).await;
    assert_eq!(watched(&app, &a.token).await, true);

    let removed = app.delete("/api/media/77/rating?mediaType=movie", token).await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(watched(&app, &a.token).await, false);
    let again = app.delete("/api/media/77/rating?mediaType=movie", token).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_upsert_keeps_one_review_per_item() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    let created = app
        .post("/api/media/550/review", token, json!({ "reviewText": "First rule.", "mediaType": "movie" }))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let updated = app
        .post("/api/media/550/review", token, json!({ "reviewText": "Second rule.", "mediaType": "movie" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(created.body["id"], updated.body["id"]);

    let mine = app.get("/api/media/550/myReview?mediaType=movie", token).await;
    assert_eq!(mine.body["reviewText"], "Second rule.");

    let blank = app
        .post("/api/media/550/review", token, json!({ "reviewText": "   ", "mediaType": "movie" }))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn media_reviews_carry_author_rating_and_like() {
    let app = TestApp::new();
    let critic = app.account().await;
    let quiet = app.account().await;

    app.post("/api/media/550/rate", Some(&critic.token), json!({ "score": 5.0, "mediaType": "movie" }))
        .await;
    app.post("/api/media/550/like", Some(&critic.token), json!({ "mediaType": "movie" })).await;
    app.post(
        "/api/media/550/review",
        Some(&critic.token),
        json!({ "reviewText": "A classic.", "mediaType": "movie" }),
    )
    .await;
    app.post(
        "/api/media/550/review",
        Some(&quiet.token),
        json!({ "reviewText": "Not for me.", "mediaType": "movie" }),
    )
    .await;

    let reviews = app.get("/api/media/550/reviews?mediaType=movie", None).await;
    assert_eq!(reviews.status, StatusCode::OK);
    let reviews = reviews.body.as_array().unwrap().clone();
    assert_eq!(reviews.len(), 2);

    let by_critic = reviews.iter().find(|r| r["userId"] == critic.id).unwrap();
    assert_eq!(by_critic["author"]["username"], critic.username);
    assert_eq!(by_critic["rating"], 5.0);
    assert_eq!(by_critic["hasLiked"], true);

    let by_quiet = reviews.iter().find(|r| r["userId"] == quiet.id).unwrap();
    assert!(by_quiet["rating"].is_null());
    assert_eq!(by_quiet["hasLiked"], false);
}

#[tokio::test]
async fn recent_reviews_are_newest_first_and_paged() {
    let app = TestApp::new();
    let a = app.account().await;
    for media_id in 1..=3 {
        app.post(
            &format!("/api/media/{media_id}/review"),
            Some(&a.token),
            json!({ "reviewText": format!("review {media_id}"), "mediaType": "movie" }),
        )
        .await;
    }

    let page = app.get("/api/reviews/recent?page=1&limit=2", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["total"], 3);
    let items = page.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["mediaId"], 3);
    assert_eq!(items[1]["mediaId"], 2);

    let rest = app.get("/api/reviews/recent?page=2&limit=2", None).await;
    assert_eq!(rest.body["items"][0]["mediaId"], 1);
}

#[tokio::test]
async fn review_delete_needs_an_existing_review() {
    let app = TestApp::new();
    let a = app.account().await;
    let token = Some(a.token.as_str());

    assert_eq!(app.delete("/api/media/9/review?mediaType=tv", token).await.status, StatusCode::NOT_FOUND);
    app.post("/api/media/9/review", token, json!({ "reviewText": "Fine.", "mediaType": "tv" })).await;
    assert_eq!(app.delete("/api/media/9/review?mediaType=tv", token).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/api/media/9/myReview?mediaType=tv", token).await.status, StatusCode::NOT_FOUND);
}
