// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{
        user_repo::{NewUser, UserChanges},
        UserRepository,
    },
    models::auth::{CreateUserPayload, Role, UpdateUserPayload, User},
    services::{
        auth::hash_password,
        policy::{authorize, Action},
    },
};

/// Diretório de contas. Todas as operações expostas exigem um admin.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn list_users(&self, caller: Option<&User>) -> Result<Vec<User>, AppError> {
        authorize(caller, Action::ManageUsers)?;
        self.repo.list_all().await
    }

    pub async fn get_user(&self, caller: Option<&User>, id: Uuid) -> Result<User, AppError> {
        authorize(caller, Action::ManageUsers)?;
        self.repo.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn create_user(
        &self,
        caller: Option<&User>,
        payload: CreateUserPayload,
    ) -> Result<User, AppError> {
        let admin = authorize(caller, Action::ManageUsers)?;
        payload.validate()?;

        let user = self
            .register(
                payload.username,
                &payload.password,
                Some(payload.name),
                payload.email.filter(|e| !e.is_empty()),
                payload.role.unwrap_or_default(),
            )
            .await?;

        tracing::info!(admin_id = %admin.id, user_id = %user.id, username = %user.username, "Usuário criado");
        Ok(user)
    }

    pub async fn update_user(
        &self,
        caller: Option<&User>,
        id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<User, AppError> {
        let admin = authorize(caller, Action::ManageUsers)?;
        payload.validate()?;

        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password, self.bcrypt_cost).await?),
            None => None,
        };

        let user = self
            .repo
            .update_user(
                id,
                UserChanges {
                    name: payload.name,
                    email: payload.email,
                    role: payload.role,
                    password_hash,
                },
            )
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(admin_id = %admin.id, user_id = %user.id, "Usuário atualizado");
        Ok(user)
    }

    /// Remove a conta. Contas que ainda possuem propostas ou comissões não são removidas.
    pub async fn delete_user(&self, caller: Option<&User>, id: Uuid) -> Result<(), AppError> {
        let admin = authorize(caller, Action::ManageUsers)?;

        if !self.repo.delete_user(id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(admin_id = %admin.id, user_id = %id, "Usuário removido");
        Ok(())
    }

    /// Cria a conta de administrador inicial se ela ainda não existir.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        let user = self
            .register(username.to_string(), password, Some("Administrador".into()), None, Role::Admin)
            .await?;
        tracing::info!(user_id = %user.id, username, "Administrador inicial criado");
        Ok(())
    }

    async fn register(
        &self,
        username: String,
        password: &str,
        name: Option<String>,
        email: Option<String>,
        role: Role,
    ) -> Result<User, AppError> {
        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        self.repo
            .create_user(NewUser { username, password_hash, name, email, role })
            .await
    }
}
