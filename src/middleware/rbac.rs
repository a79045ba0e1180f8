// src/middleware/rbac.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::Caller, i18n::Locale},
    models::auth::User,
    services::policy::{authorize, Action},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn action() -> Action;
}

/// 2. O Extractor (Guardião). Carrega o usuário já autorizado.
pub struct RequirePermission<T>(pub User, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts.extensions.get::<Caller>().cloned().unwrap_or_default();

        match authorize(caller.user(), T::action()) {
            Ok(user) => Ok(RequirePermission(user.clone(), PhantomData)),
            Err(e) => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_headers(&parts.headers);
                Err(e.to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn action() -> Action { Action::ManageUsers }
}
