use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Router};
use domains::models::RankingKind;
use tower_http::services::ServeDir;

use crate::handlers::{accounts, lists, media, ops, rankings, users};
use crate::middleware::{cors_policy, standard_middleware, track_requests};
use crate::state::AppState;

/// HTTP-level knobs that do not belong to any service.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Directory served read-only under `url_prefix`.
    pub upload_dir: PathBuf,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            upload_dir: PathBuf::from("./data/uploads"),
            url_prefix: "/uploads".to_owned(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

fn ranking_routes(mut router: Router<AppState>) -> Router<AppState> {
    for kind in RankingKind::ALL {
        let slug = kind.slug();
        router = router
            .route(
                &format!("/api/users/{slug}"),
                get(rankings::own).post(rankings::replace).layer(Extension(kind)),
            )
            .route(
                &format!("/api/users/{slug}/{{item_id}}"),
                delete(rankings::remove).layer(Extension(kind)),
            )
            .route(
                &format!("/api/users/{{user_id}}/{slug}"),
                get(rankings::of_user).layer(Extension(kind)),
            );
    }
    router
}

pub fn router(state: AppState, config: &HttpConfig) -> Router {
    let api = Router::new()
        // identity
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/api/users/me", get(accounts::me).delete(accounts::delete_me))
        .route("/api/users/profile", put(accounts::update_profile))
        .route(
            "/api/users/profile-picture",
            put(accounts::update_profile_picture).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        // per-media state
        .route("/api/media/{media_id}/rate", post(media::rate))
        .route("/api/media/{media_id}/rating", get(media::rating).delete(media::delete_rating))
        .route("/api/media/{media_id}/like", post(media::toggle_like))
        .route("/api/media/{media_id}/like-status", get(media::like_status))
        .route("/api/media/{media_id}/watchlist", post(media::toggle_watchlist))
        .route("/api/media/{media_id}/watchlist-status", get(media::watchlist_status))
        .route("/api/media/{media_id}/watched-status", get(media::watched_status))
        .route("/api/media/{media_id}/review", post(media::upsert_review).delete(media::delete_review))
        .route("/api/media/{media_id}/reviews", get(media::reviews_for_media))
        .route("/api/media/{media_id}/myReview", get(media::my_review))
        .route("/api/reviews/recent", get(media::recent_reviews))
        // profiles and collections
        .route("/api/users", get(users::list_users))
        .route("/api/users/search", get(users::search))
        .route("/api/users/watchlist", get(users::own_watchlist))
        .route("/api/users/watchlist/privacy", put(users::set_watchlist_privacy))
        .route("/api/users/lists", get(lists::own))
        .route("/api/users/username/{username}", get(users::profile_by_username))
        .route("/api/users/{user_id}", get(users::profile))
        .route("/api/users/{user_id}/ratings", get(users::ratings))
        .route("/api/users/{user_id}/likes", get(users::likes))
        .route("/api/users/{user_id}/reviews", get(users::reviews))
        .route("/api/users/{user_id}/lists", get(users::lists))
        .route("/api/users/{user_id}/watchlist", get(users::watchlist))
        // lists
        .route("/api/lists", post(lists::create).get(lists::feed))
        .route("/api/lists/{list_id}", get(lists::get).put(lists::update).delete(lists::delete))
        // operational
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics));

    let api = ranking_routes(api)
        .route_layer(from_fn_with_state(state.metrics.clone(), track_requests))
        .with_state(state);

    let app = api
        .nest_service(&config.url_prefix, ServeDir::new(&config.upload_dir))
        .layer(cors_policy(&config.cors_origins));
    standard_middleware(app)
}
