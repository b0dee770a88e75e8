//! Top-10 rankings. Each route is mounted once per [`RankingKind`], which
//! reaches the handler as a route extension.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use domains::models::{RankedEntry, RankingKind, UserId};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankedId {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RankingBody {
    #[serde(default)]
    pub items: Vec<RankedId>,
}

pub async fn replace(
    State(state): State<AppState>,
    Extension(kind): Extension<RankingKind>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<RankingBody>,
) -> ApiResult<Json<Vec<RankedEntry>>> {
    let ids = body.items.into_iter().map(|item| item.id).collect();
    Ok(Json(state.services.rankings.replace(user_id, kind, ids).await?))
}

pub async fn own(
    State(state): State<AppState>,
    Extension(kind): Extension<RankingKind>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<RankedEntry>>> {
    Ok(Json(state.services.rankings.get(user_id, kind).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(kind): Extension<RankingKind>,
    AuthUser(user_id): AuthUser,
    ApiPath(item_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.services.rankings.remove(user_id, kind, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn of_user(
    State(state): State<AppState>,
    Extension(kind): Extension<RankingKind>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<RankedEntry>>> {
    Ok(Json(state.services.profiles.ranking_of(user_id, kind).await?))
}
