// src/services/resolver.rs

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{common::error::AppError, db::ComissaoRepository, models::proposta::TipoProposta};

/// valor * percentual / 100, arredondado (meio para longe do zero) a 2 casas.
pub fn compute_commission(valor: Decimal, percentual: Decimal) -> Result<Decimal, AppError> {
    let bruta = valor
        .checked_mul(percentual)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            anyhow::anyhow!("Estouro no cálculo da comissão: {} * {}%", valor, percentual)
        })?;

    let mut comissao = bruta.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // A divisão pode normalizar a escala; fixa em 2 como no NUMERIC(15,2)
    comissao.rescale(2);
    Ok(comissao)
}

/// Busca a taxa ativa de (usuário, banco, tipo) e calcula a comissão.
#[derive(Clone)]
pub struct CommissionResolver {
    repo: Arc<dyn ComissaoRepository>,
}

impl CommissionResolver {
    pub fn new(repo: Arc<dyn ComissaoRepository>) -> Self {
        Self { repo }
    }

    /// Percentual aplicável; zero quando nenhuma taxa ativa casa com a chave.
    pub async fn resolve(
        &self,
        user_id: Uuid,
        banco: &str,
        tipo: TipoProposta,
    ) -> Result<Decimal, AppError> {
        let percentual = self
            .repo
            .find_active(user_id, banco, tipo)
            .await?
            .map(|c| c.percentual)
            .unwrap_or(Decimal::ZERO);
        Ok(percentual)
    }

    pub async fn commission_for(
        &self,
        user_id: Uuid,
        banco: &str,
        tipo: TipoProposta,
        valor: Decimal,
    ) -> Result<Decimal, AppError> {
        let percentual = self.resolve(user_id, banco, tipo).await?;
        compute_commission(valor, percentual)
    }
}
