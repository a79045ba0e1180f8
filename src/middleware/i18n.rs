// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n::DEFAULT_LANG;

// Idiomas com catálogo de mensagens
const SUPPORTED: [&str; 2] = ["pt", "en"];

// Extrator de idioma, a partir do Accept-Language
#[derive(Debug, Clone, PartialEq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// Primeira língua suportada da lista do cliente, na ordem de preferência.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str).into_iter().find_map(|tag| {
                    // "pt-BR" -> "pt"
                    let primary = tag.split('-').next().unwrap_or(&tag).to_ascii_lowercase();
                    SUPPORTED.contains(&primary.as_str()).then_some(primary)
                })
            })
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}
