//! Public profile reads plus the caller's own watchlist.

use axum::extract::State;
use axum::Json;
use domains::models::{Like, ListWithItems, Page, PublicUser, Rating, Review, UserId, UserProfile, WatchlistEntry};
use serde::{Deserialize, Serialize};

use super::PageQuery;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyBody {
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyResponse {
    pub is_public: bool,
    /// Watchlist rows the change touched.
    pub updated: u64,
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<PublicUser>>> {
    Ok(Json(state.services.profiles.users(query.into()).await?))
}

pub async fn search(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    Ok(Json(state.services.profiles.search(&query.q).await?))
}

pub async fn profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.services.profiles.profile(user_id).await?))
}

pub async fn profile_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.services.profiles.profile_by_username(&username).await?))
}

pub async fn ratings(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<Rating>>> {
    Ok(Json(state.services.profiles.ratings_of(user_id).await?))
}

pub async fn likes(State(state): State<AppState>, ApiPath(user_id): ApiPath<UserId>) -> ApiResult<Json<Vec<Like>>> {
    Ok(Json(state.services.profiles.likes_of(user_id).await?))
}

pub async fn reviews(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(state.services.profiles.reviews_of(user_id).await?))
}

pub async fn lists(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<ListWithItems>>> {
    Ok(Json(state.services.profiles.lists_of(user_id).await?))
}

pub async fn watchlist(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(state.services.profiles.watchlist_of(user_id).await?))
}

pub async fn own_watchlist(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(state.services.watchlist.own(user_id).await?))
}

pub async fn set_watchlist_privacy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<PrivacyBody>,
) -> ApiResult<Json<PrivacyResponse>> {
    let updated = state.services.watchlist.set_visibility(user_id, body.is_public).await?;
    Ok(Json(PrivacyResponse {
        is_public: body.is_public,
        updated,
    }))
}
