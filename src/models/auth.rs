// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Master,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

// A "visão pública" devolvida no login e no /me
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
}

// Dados para criação de conta (somente admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 100, message = "invalid_username"))]
    pub username: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub role: Option<Role>,
}

// Atualização parcial de conta; campos ausentes ficam como estão
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub username: String,
    pub role: Role,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
