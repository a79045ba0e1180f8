// src/handlers/users.rs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermManageUsers, RequirePermission},
    },
    models::auth::{CreateUserPayload, SuccessResponse, UpdateUserPayload},
};

// GET /api/users/list
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    RequirePermission(admin, _): RequirePermission<PermManageUsers>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list_users(Some(&admin))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// POST /api/users/create
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequirePermission(admin, _): RequirePermission<PermManageUsers>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .user_service
        .create_user(Some(&admin), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(SuccessResponse::ok()))
}

// GET /api/users/{id}
pub async fn get_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequirePermission(admin, _): RequirePermission<PermManageUsers>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_service
        .get_user(Some(&admin), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}

// PUT /api/users/{id}
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequirePermission(admin, _): RequirePermission<PermManageUsers>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .update_user(Some(&admin), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}

// DELETE /api/users/{id}
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    RequirePermission(admin, _): RequirePermission<PermManageUsers>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete_user(Some(&admin), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(SuccessResponse::ok()))
}
