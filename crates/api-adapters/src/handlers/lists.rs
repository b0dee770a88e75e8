use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domains::models::{ListWithItems, MediaKey, MediaType, Page};
use serde::Deserialize;
use services::{ListDraft, ListEdit};

use super::PageQuery;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub media_id: i64,
    pub media_type: MediaType,
}

impl From<ItemBody> for MediaKey {
    fn from(item: ItemBody) -> Self {
        MediaKey::new(item.media_id, item.media_type)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListBody {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub is_numbered: Option<bool>,
    pub is_public: Option<bool>,
    #[serde(default)]
    pub items: Vec<ItemBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_numbered: Option<bool>,
    pub is_public: Option<bool>,
    /// Present means replace the whole item set.
    pub items: Option<Vec<ItemBody>>,
}

fn keys(items: Vec<ItemBody>) -> Vec<MediaKey> {
    items.into_iter().map(MediaKey::from).collect()
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateListBody>,
) -> ApiResult<impl IntoResponse> {
    let draft = ListDraft {
        name: body.name,
        description: body.description,
        is_numbered: body.is_numbered,
        is_public: body.is_public,
        items: keys(body.items),
    };
    let created = state.services.lists.create(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(State(state): State<AppState>, ApiPath(list_id): ApiPath<i64>) -> ApiResult<Json<ListWithItems>> {
    Ok(Json(state.services.lists.public(list_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(list_id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateListBody>,
) -> ApiResult<Json<ListWithItems>> {
    let edit = ListEdit {
        name: body.name,
        description: body.description,
        is_numbered: body.is_numbered,
        is_public: body.is_public,
        items: body.items.map(keys),
    };
    Ok(Json(state.services.lists.update(list_id, user_id, edit).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(list_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.services.lists.delete(list_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Page<ListWithItems>>> {
    Ok(Json(state.services.lists.feed(query.into()).await?))
}

pub async fn own(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> ApiResult<Json<Vec<ListWithItems>>> {
    Ok(Json(state.services.lists.own(user_id).await?))
}
