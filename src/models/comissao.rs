// src/models/comissao.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::money::{validate_percentual, MONEY_RE},
    models::proposta::TipoProposta,
};

// Uma taxa de comissão para (usuário, banco, tipo)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comissao {
    pub id: Uuid,
    pub user_id: Uuid,
    pub banco: String,
    pub tipo: TipoProposta,
    pub percentual: Decimal, // NUMERIC(5,2)
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NovaComissao {
    pub user_id: Uuid,
    pub banco: String,
    pub tipo: TipoProposta,
    pub percentual: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComissaoInput {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "invalid_length"))]
    pub banco: String,

    pub tipo: TipoProposta,

    #[validate(regex(path = *MONEY_RE, message = "invalid_money"), custom(function = "validate_percentual"))]
    pub percentual: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComissaoInput {
    pub id: Uuid,

    #[validate(regex(path = *MONEY_RE, message = "invalid_money"), custom(function = "validate_percentual"))]
    pub percentual: Option<String>,

    pub ativo: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdInput {
    pub user_id: Uuid,
}
