// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{
        ComissaoRepository, PgComissaoRepository, PgPropostaRepository, PgUserRepository,
        PropostaRepository, UserRepository,
    },
    services::{
        auth::AuthService, comissao_service::ComissaoService, proposta_service::PropostaService,
        resolver::CommissionResolver, user_service::UserService,
    },
};

// Credenciais da conta de administrador criada na inicialização
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub session_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub admin: Option<AdminBootstrap>,
    pub db_max_connections: u32,
}

impl Config {
    /// Lê o ambiente (com suporte a `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} deve ser definida", name))
        };

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { username, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            session_ttl: chrono::Duration::hours(parse_or(&lookup, "SESSION_TTL_HOURS", 24)?),
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 10)?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            admin,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Valor inválido para {}: {:?}", name, raw)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub comissao_service: ComissaoService,
    pub proposta_service: PropostaService,
}

impl AppState {
    /// Conecta ao banco uma única vez, roda as migrações e monta o grafo de dependências.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                tracing::error!("Falha ao conectar ao banco de dados: {}", e);
                AppError::StorageUnavailable(e.to_string())
            })?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self::with_repositories(
            config,
            Arc::new(PgUserRepository::new(db_pool.clone())),
            Arc::new(PgComissaoRepository::new(db_pool.clone())),
            Arc::new(PgPropostaRepository::new(db_pool)),
        ))
    }

    pub fn with_repositories(
        config: Config,
        users: Arc<dyn UserRepository>,
        comissoes: Arc<dyn ComissaoRepository>,
        propostas: Arc<dyn PropostaRepository>,
    ) -> Self {
        let auth_service =
            AuthService::new(users.clone(), config.jwt_secret.clone(), config.session_ttl);
        let user_service = UserService::new(users.clone(), config.bcrypt_cost);
        let comissao_service = ComissaoService::new(comissoes.clone(), users);
        let proposta_service = PropostaService::new(propostas, CommissionResolver::new(comissoes));

        Self {
            config: Arc::new(config),
            i18n_store: I18nStore::new(),
            auth_service,
            user_service,
            comissao_service,
            proposta_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]))
                .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.session_ttl, chrono::Duration::hours(24));
        assert_eq!(config.bcrypt_cost, 10);
        assert!(!config.cookie_secure);
        assert!(config.admin.is_none());
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn missing_required_variable_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn reads_overrides_and_bootstrap_admin() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("SESSION_TTL_HOURS", "8"),
            ("COOKIE_SECURE", "true"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "admin123"),
        ]))
        .unwrap();
        assert_eq!(config.session_ttl, chrono::Duration::hours(8));
        assert!(config.cookie_secure);
        assert_eq!(config.admin.unwrap().username, "admin");

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("BCRYPT_COST", "muito"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("BCRYPT_COST"));
    }
}
