// src/handlers/auth.rs

use axum::{extract::rejection::JsonRejection, extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{removal_cookie, session_cookie, AuthenticatedUser},
        i18n::Locale,
    },
    models::auth::{LoginResponse, LoginUserPayload, PublicUser, SuccessResponse},
};

// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    payload: Result<Json<LoginUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let Json(payload) = payload.map_err(|e| to_api(e.into()))?;
    payload.validate().map_err(|e| to_api(e.into()))?;

    let (token, user) = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await
        .map_err(to_api)?;

    let cookie = session_cookie(
        token,
        app_state.auth_service.session_ttl(),
        app_state.config.cookie_secure,
    );

    Ok((
        jar.add(cookie),
        Json(LoginResponse { success: true, user: PublicUser::from(&user) }),
    ))
}

// POST /api/auth/logout. Sempre responde sucesso, com ou sem sessão.
pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(removal_cookie(app_state.config.cookie_secure)),
        Json(SuccessResponse::ok()),
    )
}

// GET /api/auth/me
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}
