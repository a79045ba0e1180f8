// src/db/comissao_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        comissao::{Comissao, NovaComissao},
        proposta::TipoProposta,
    },
};

// Índice parcial que garante uma única taxa ativa por (usuário, banco, tipo)
const ACTIVE_UNIQUE_INDEX: &str = "comissoes_ativa_unica";

#[async_trait]
pub trait ComissaoRepository: Send + Sync {
    async fn create(&self, nova: NovaComissao) -> Result<Comissao, AppError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Comissao>, AppError>;
    async fn list_all(&self) -> Result<Vec<Comissao>, AppError>;
    /// Taxa ativa para a chave exata (banco e tipo comparados por igualdade).
    async fn find_active(
        &self,
        user_id: Uuid,
        banco: &str,
        tipo: TipoProposta,
    ) -> Result<Option<Comissao>, AppError>;
    async fn update(
        &self,
        id: Uuid,
        percentual: Option<Decimal>,
        ativo: Option<bool>,
    ) -> Result<Option<Comissao>, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgComissaoRepository {
    pool: PgPool,
}

impl PgComissaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COMISSAO_COLUMNS: &str =
    "id, user_id, banco, tipo, percentual, ativo, created_at, updated_at";

fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(ACTIVE_UNIQUE_INDEX) {
            return AppError::DuplicateCommissionRate;
        }
        if db_err.is_foreign_key_violation() {
            return AppError::UserNotFound;
        }
    }
    e.into()
}

#[async_trait]
impl ComissaoRepository for PgComissaoRepository {
    async fn create(&self, nova: NovaComissao) -> Result<Comissao, AppError> {
        sqlx::query_as::<_, Comissao>(&format!(
            r#"
            INSERT INTO comissoes (id, user_id, banco, tipo, percentual)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMISSAO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(nova.user_id)
        .bind(&nova.banco)
        .bind(nova.tipo)
        .bind(nova.percentual)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Comissao>, AppError> {
        let comissoes = sqlx::query_as::<_, Comissao>(&format!(
            "SELECT {COMISSAO_COLUMNS} FROM comissoes WHERE user_id = $1 ORDER BY banco, tipo"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comissoes)
    }

    async fn list_all(&self) -> Result<Vec<Comissao>, AppError> {
        let comissoes = sqlx::query_as::<_, Comissao>(&format!(
            "SELECT {COMISSAO_COLUMNS} FROM comissoes ORDER BY user_id, banco, tipo"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(comissoes)
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        banco: &str,
        tipo: TipoProposta,
    ) -> Result<Option<Comissao>, AppError> {
        // O índice parcial garante no máximo uma linha; o ORDER BY só torna
        // a escolha determinística em bancos migrados de dados antigos.
        let comissao = sqlx::query_as::<_, Comissao>(&format!(
            r#"
            SELECT {COMISSAO_COLUMNS} FROM comissoes
            WHERE user_id = $1 AND banco = $2 AND tipo = $3 AND ativo
            ORDER BY created_at ASC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(banco)
        .bind(tipo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comissao)
    }

    async fn update(
        &self,
        id: Uuid,
        percentual: Option<Decimal>,
        ativo: Option<bool>,
    ) -> Result<Option<Comissao>, AppError> {
        sqlx::query_as::<_, Comissao>(&format!(
            r#"
            UPDATE comissoes SET
                percentual = COALESCE($2, percentual),
                ativo      = COALESCE($3, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COMISSAO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(percentual)
        .bind(ativo)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comissoes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
