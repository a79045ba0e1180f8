// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    session_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self { user_repo, jwt_secret, session_ttl }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        self.session_ttl
    }

    /// Valida as credenciais, registra o acesso e devolve (token, usuário).
    /// Usuário inexistente e senha errada produzem o mesmo erro.
    pub async fn login_user(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            tracing::warn!(username, "Login recusado");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!(username, "Login recusado");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        self.user_repo.touch_last_signed_in(user.id).await?;
        tracing::info!(user_id = %user.id, username, "Login efetuado");

        Ok((token, user))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;
        Ok(token_data.claims)
    }

    /// Resolve o token para o usuário atual. Qualquer falha (assinatura,
    /// expiração, usuário removido, banco fora do ar) vira `None`: a requisição
    /// segue como anônima e cada operação decide se exige sessão.
    pub async fn resolve(&self, token: &str) -> Option<User> {
        let claims = match self.validate_token(token) {
            Ok(claims) => claims,
            Err(_) => {
                tracing::debug!("Token de sessão rejeitado");
                return None;
            }
        };

        match self.user_repo.find_by_id(claims.sub).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Falha ao resolver sessão: {}", e);
                None
            }
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

// O bcrypt é caro; roda fora das threads do runtime.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?;

    // Hash corrompido no banco conta como senha errada
    Ok(is_valid.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{memory::MemoryStore, user_repo::NewUser},
        models::auth::Role,
    };

    const SECRET: &str = "segredo-de-teste";
    const TEST_COST: u32 = 4;

    async fn service_with_user(username: &str, password: &str) -> (AuthService, User) {
        let store = Arc::new(MemoryStore::new());
        let repo: Arc<dyn UserRepository> = store;
        let user = repo
            .create_user(NewUser {
                username: username.into(),
                password_hash: hash_password(password, TEST_COST).await.unwrap(),
                name: Some("Maria".into()),
                email: None,
                role: Role::User,
            })
            .await
            .unwrap();
        let service = AuthService::new(repo, SECRET.into(), chrono::Duration::hours(24));
        (service, user)
    }

    #[tokio::test]
    async fn login_issues_token_and_records_sign_in() {
        let (service, user) = service_with_user("maria", "senha123").await;

        let (token, logged) = service.login_user("maria", "senha123").await.unwrap();
        assert_eq!(logged.id, user.id);

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);

        let resolved = service.resolve(&token).await.unwrap();
        assert!(resolved.last_signed_in.is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let (service, _) = service_with_user("maria", "senha123").await;

        let wrong = service.login_user("maria", "errada").await.unwrap_err();
        let unknown = service.login_user("joao", "senha123").await.unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn resolve_fails_open() {
        let (service, user) = service_with_user("maria", "senha123").await;

        assert!(service.resolve("nem-um-jwt").await.is_none());

        let forged = AuthService::new(
            Arc::new(MemoryStore::new()),
            "outro-segredo".into(),
            chrono::Duration::hours(24),
        )
        .create_token(&user)
        .unwrap();
        assert!(service.resolve(&forged).await.is_none());

        let expired = AuthService::new(
            Arc::new(MemoryStore::new()),
            SECRET.into(),
            chrono::Duration::hours(-2),
        )
        .create_token(&user)
        .unwrap();
        assert!(service.resolve(&expired).await.is_none());
    }

    #[tokio::test]
    async fn token_for_deleted_user_resolves_to_none() {
        let store = Arc::new(MemoryStore::new());
        let repo: Arc<dyn UserRepository> = store;
        let user = repo
            .create_user(NewUser {
                username: "temp".into(),
                password_hash: "x".into(),
                name: None,
                email: None,
                role: Role::User,
            })
            .await
            .unwrap();
        let service = AuthService::new(repo.clone(), SECRET.into(), chrono::Duration::hours(24));
        let token = service.create_token(&user).unwrap();

        assert!(repo.delete_user(user.id).await.unwrap());
        assert!(service.resolve(&token).await.is_none());
    }
}
