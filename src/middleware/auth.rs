// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use time::OffsetDateTime;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// Nome do cookie de sessão
pub const SESSION_COOKIE: &str = "session_token";

// Usuário da requisição atual, resolvido uma única vez pelo `session_layer`.
// `None` = anônimo; cada operação decide se isso basta.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<User>);

impl Caller {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Token da requisição: cookie de sessão primeiro, `Authorization: Bearer` como alternativa.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_owned())
        })
}

// O middleware em si. Nunca rejeita: token ausente ou inválido vira sessão anônima.
pub async fn session_layer(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match session_token(request.headers()) {
        Some(token) => app_state.auth_service.resolve(&token).await,
        None => None,
    };

    request.extensions_mut().insert(Caller(user));
    next.run(request).await
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}

// Extrator para rotas que exigem sessão válida
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Caller>().and_then(|c| c.0.clone()) {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => {
                let app_state = AppState::from_ref(state);
                let locale = Locale::from_headers(&parts.headers);
                Err(AppError::Unauthorized.to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

/// Cookie emitido no login.
pub fn session_cookie(token: String, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Cookie vazio e já expirado, que apaga a sessão no navegador.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tema=escuro; session_token=abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));

        headers.remove(header::COOKIE);
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok".into(), chrono::Duration::hours(24), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));

        let removal = removal_cookie(false);
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
    }
}
