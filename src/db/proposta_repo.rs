// src/db/proposta_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::proposta::{NovaProposta, Proposta},
};

#[async_trait]
pub trait PropostaRepository: Send + Sync {
    async fn create(&self, nova: NovaProposta) -> Result<Proposta, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposta>, AppError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Proposta>, AppError>;
    async fn list_all(&self) -> Result<Vec<Proposta>, AppError>;
    /// Grava os campos editáveis (incluindo a comissão já calculada).
    async fn update(&self, proposta: &Proposta) -> Result<Option<Proposta>, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgPropostaRepository {
    pool: PgPool,
}

impl PgPropostaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROPOSTA_COLUMNS: &str = "id, user_id, numero_proposta, numero_parcelas, banco, valor, \
                                tipo, comissao, created_at, updated_at";

#[async_trait]
impl PropostaRepository for PgPropostaRepository {
    async fn create(&self, nova: NovaProposta) -> Result<Proposta, AppError> {
        let proposta = sqlx::query_as::<_, Proposta>(&format!(
            r#"
            INSERT INTO propostas (
                id, user_id, numero_proposta, numero_parcelas,
                banco, valor, tipo, comissao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROPOSTA_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(nova.user_id)
        .bind(&nova.numero_proposta)
        .bind(nova.numero_parcelas)
        .bind(&nova.banco)
        .bind(nova.valor)
        .bind(nova.tipo)
        .bind(nova.comissao)
        .fetch_one(&self.pool)
        .await?;
        Ok(proposta)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposta>, AppError> {
        let proposta = sqlx::query_as::<_, Proposta>(&format!(
            "SELECT {PROPOSTA_COLUMNS} FROM propostas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(proposta)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Proposta>, AppError> {
        let propostas = sqlx::query_as::<_, Proposta>(&format!(
            "SELECT {PROPOSTA_COLUMNS} FROM propostas WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(propostas)
    }

    async fn list_all(&self) -> Result<Vec<Proposta>, AppError> {
        let propostas = sqlx::query_as::<_, Proposta>(&format!(
            "SELECT {PROPOSTA_COLUMNS} FROM propostas ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(propostas)
    }

    async fn update(&self, proposta: &Proposta) -> Result<Option<Proposta>, AppError> {
        let updated = sqlx::query_as::<_, Proposta>(&format!(
            r#"
            UPDATE propostas SET
                numero_proposta = $2,
                numero_parcelas = $3,
                banco           = $4,
                valor           = $5,
                tipo            = $6,
                comissao        = $7,
                updated_at      = NOW()
            WHERE id = $1
            RETURNING {PROPOSTA_COLUMNS}
            "#
        ))
        .bind(proposta.id)
        .bind(&proposta.numero_proposta)
        .bind(proposta.numero_parcelas)
        .bind(&proposta.banco)
        .bind(proposta.valor)
        .bind(proposta.tipo)
        .bind(proposta.comissao)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM propostas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
