// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

// Dados já prontos para inserção (senha já com hash)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

// Atualização parcial: `None` mantém o valor atual
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// Diretório de contas.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn list_all(&self) -> Result<Vec<User>, AppError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn touch_last_signed_in(&self, id: Uuid) -> Result<(), AppError>;
    /// `Ok(false)` quando o id não existe.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, name, role, created_at, updated_at, last_signed_in";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Com tratamento de erro específico para nomes de usuário duplicados.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, password_hash, name, email, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateUsername;
                }
            }
            e.into()
        })
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                email         = COALESCE($3, email),
                role          = COALESCE($4, role),
                password_hash = COALESCE($5, password_hash),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn touch_last_signed_in(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_signed_in = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // FKs com ON DELETE RESTRICT: o usuário ainda tem propostas ou comissões
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::UserHasDependents;
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
