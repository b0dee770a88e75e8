//! Registration, login and everything the caller can do to their own account.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domains::models::User;
use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use services::{ProfileEdit, Registration};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, AuthUser};
use crate::state::AppState;

/// Multipart field carrying the avatar image.
pub const PICTURE_FIELD: &str = "profilePicture";

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    pub username: Option<String>,
    pub slogan: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterBody>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .services
        .accounts
        .register(Registration {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state.services.accounts.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
    }))
}

pub async fn me(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(state.services.accounts.current_user(user_id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<ProfileBody>,
) -> ApiResult<Json<User>> {
    let edit = ProfileEdit {
        username: body.username,
        slogan: body.slogan,
    };
    Ok(Json(state.services.accounts.update_profile(user_id, edit).await?))
}

pub async fn update_profile_picture(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<User>> {
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }
        let content_type: Mime = field
            .content_type()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ApiError::bad_request("profile picture needs a content type"))?;
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;

        let user = state
            .services
            .accounts
            .update_profile_picture(user_id, data, content_type)
            .await?;
        return Ok(Json(user));
    }

    Err(ApiError::bad_request(format!("multipart field {PICTURE_FIELD:?} is required")))
}

pub async fn delete_me(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> ApiResult<StatusCode> {
    state.services.accounts.delete_account(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
