//! Per-media user state: ratings, likes, watchlist membership and reviews.
//! Writes carry `mediaType` in the body, reads in the query string.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domains::errors::DomainError;
use domains::models::{AuthoredReview, EnrichedReview, MediaType, Page, Rating, Review, Toggle, Upserted};
use serde::Deserialize;
use serde_json::json;

use super::{media_key, MediaTypeParam, PageQuery};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBody {
    pub score: Option<f64>,
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    #[serde(default)]
    pub review_text: String,
    pub media_type: Option<MediaType>,
}

fn upserted_status<T>(outcome: &Upserted<T>) -> StatusCode {
    if outcome.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

fn toggled(outcome: Toggle, field: &str) -> (StatusCode, Json<serde_json::Value>) {
    let status = if outcome.is_present() { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(json!({ field: outcome.is_present() })))
}

pub async fn rate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiJson(body): ApiJson<RateBody>,
) -> ApiResult<impl IntoResponse> {
    let key = media_key(media_id, body.media_type)?;
    let score = body.score.ok_or_else(|| DomainError::validation("score is required"))?;
    let outcome = state.services.ratings.rate(user_id, key, score).await?;
    Ok((upserted_status(&outcome), Json(outcome.into_inner())))
}

pub async fn rating(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<Rating>> {
    let key = media_key(media_id, query.media_type)?;
    Ok(Json(state.services.ratings.rating(user_id, key).await?))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<StatusCode> {
    let key = media_key(media_id, query.media_type)?;
    state.services.ratings.remove(user_id, key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiJson(body): ApiJson<MediaTypeParam>,
) -> ApiResult<impl IntoResponse> {
    let key = media_key(media_id, body.media_type)?;
    let outcome = state.services.likes.toggle(user_id, key).await?;
    Ok(toggled(outcome, "liked"))
}

pub async fn like_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<serde_json::Value>> {
    let key = media_key(media_id, query.media_type)?;
    let liked = state.services.likes.is_liked(user_id, key).await?;
    Ok(Json(json!({ "liked": liked })))
}

pub async fn toggle_watchlist(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiJson(body): ApiJson<MediaTypeParam>,
) -> ApiResult<impl IntoResponse> {
    let key = media_key(media_id, body.media_type)?;
    let outcome = state.services.watchlist.toggle(user_id, key).await?;
    Ok(toggled(outcome, "inWatchlist"))
}

pub async fn watchlist_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<serde_json::Value>> {
    let key = media_key(media_id, query.media_type)?;
    let in_watchlist = state.services.watchlist.contains(user_id, key).await?;
    Ok(Json(json!({ "inWatchlist": in_watchlist })))
}

pub async fn watched_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<serde_json::Value>> {
    let key = media_key(media_id, query.media_type)?;
    let watched = state.services.ratings.is_watched(user_id, key).await?;
    Ok(Json(json!({ "watched": watched })))
}

pub async fn upsert_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> ApiResult<impl IntoResponse> {
    let key = media_key(media_id, body.media_type)?;
    let outcome = state.services.reviews.upsert(user_id, key, &body.review_text).await?;
    Ok((upserted_status(&outcome), Json(outcome.into_inner())))
}

pub async fn reviews_for_media(
    State(state): State<AppState>,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<Vec<EnrichedReview>>> {
    let key = media_key(media_id, query.media_type)?;
    Ok(Json(state.services.reviews.for_media(key).await?))
}

pub async fn my_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<Json<Review>> {
    let key = media_key(media_id, query.media_type)?;
    Ok(Json(state.services.reviews.own(user_id, key).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(media_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<MediaTypeParam>,
) -> ApiResult<StatusCode> {
    let key = media_key(media_id, query.media_type)?;
    state.services.reviews.remove(user_id, key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recent_reviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<AuthoredReview>>> {
    Ok(Json(state.services.reviews.recent(query.into()).await?))
}
