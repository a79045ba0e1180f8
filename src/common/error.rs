use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão ausente ou inválida")]
    Unauthorized,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Proposta não encontrada")]
    PropostaNotFound,

    #[error("Comissão não encontrada")]
    ComissaoNotFound,

    #[error("Procedimento desconhecido: {0}")]
    UnknownProcedure(String),

    #[error("Método não suportado para este procedimento")]
    MethodNotSupported,

    #[error("Nome de usuário já existe")]
    DuplicateUsername,

    #[error("Já existe comissão ativa para (usuário, banco, tipo)")]
    DuplicateCommissionRate,

    #[error("Usuário possui registros vinculados")]
    UserHasDependents,

    // Pool fechado, timeout de conexão ou falha de I/O com o banco
    #[error("Armazenamento indisponível: {0}")]
    StorageUnavailable(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[source] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StorageUnavailable(e.to_string())
            }
            other => AppError::DatabaseError(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::PropostaNotFound
            | AppError::ComissaoNotFound
            | AppError::UnknownProcedure(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
            AppError::DuplicateCommissionRate | AppError::UserHasDependents => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável, exposto aos clientes da superfície RPC.
    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_SUPPORTED",
            StatusCode::CONFLICT => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::UserNotFound => "user_not_found",
            AppError::PropostaNotFound => "proposta_not_found",
            AppError::ComissaoNotFound => "comissao_not_found",
            AppError::UnknownProcedure(_) => "unknown_procedure",
            AppError::MethodNotSupported => "method_not_supported",
            AppError::DuplicateUsername => "duplicate_username",
            AppError::DuplicateCommissionRate => "duplicate_comissao",
            AppError::UserHasDependents => "user_has_dependents",
            _ => "internal_error",
        }
    }

    /// Converte o erro na resposta localizada.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, key))
                        })
                        .collect();
                    details.insert(camel_case(&field), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::InvalidBody(reason) => Some(Value::String(reason.clone())),
            _ => None,
        };

        ApiError {
            status,
            code: self.code(),
            error: store.translate(&locale.0, self.message_key()),
            details,
        }
    }
}

// Os campos chegam com o nome do struct; o cliente usa camelCase.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// A forma "de fio" de um erro: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "code": self.code, "details": details }),
            None => json!({ "error": self.error, "code": self.code }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn maps_taxonomy_to_status_and_code() {
        assert_eq!(AppError::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::PropostaNotFound.code(), "NOT_FOUND");
        assert_eq!(AppError::DuplicateUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateCommissionRate.code(), "CONFLICT");
        assert_eq!(
            AppError::StorageUnavailable("pool closed".into()).code(),
            "INTERNAL_SERVER_ERROR"
        );
    }

    #[test]
    fn pool_failures_become_storage_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::StorageUnavailable(_)));

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn validation_details_are_translated() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("money");
        err.message = Some("invalid_money".into());
        errors.add("valor", err);

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("en".into()), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "One or more fields are invalid.");
        let details = api.details.expect("details");
        assert_eq!(
            details["valor"][0],
            "Use digits only, with up to two decimal places (e.g. 1500.50)."
        );
    }

    #[test]
    fn validation_details_use_client_field_names() {
        let mut errors = ValidationErrors::new();
        errors.add("numero_parcelas", ValidationError::new("range"));
        errors.add("user_id", ValidationError::new("required"));
        errors.add("banco", ValidationError::new("length"));

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("pt".into()), &I18nStore::new());
        let details = api.details.expect("details");

        assert!(details.get("numeroParcelas").is_some());
        assert!(details.get("userId").is_some());
        assert!(details.get("banco").is_some());
        assert!(details.get("numero_parcelas").is_none());
    }
}
