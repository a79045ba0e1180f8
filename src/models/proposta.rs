// src/models/proposta.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::common::money::{validate_valor, MONEY_RE};

// --- ENUMS ---

// Mapeia o CREATE TYPE tipo_proposta do banco (conjunto fechado)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tipo_proposta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoProposta {
    Novo,
    Refinanciamento,
    Portabilidade,
    RefinPortabilidade,
    RefinCarteira,
    Fgts,
    Clt,
    Outros,
}

impl TipoProposta {
    pub const ALL: [TipoProposta; 8] = [
        TipoProposta::Novo,
        TipoProposta::Refinanciamento,
        TipoProposta::Portabilidade,
        TipoProposta::RefinPortabilidade,
        TipoProposta::RefinCarteira,
        TipoProposta::Fgts,
        TipoProposta::Clt,
        TipoProposta::Outros,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TipoProposta::Novo => "novo",
            TipoProposta::Refinanciamento => "refinanciamento",
            TipoProposta::Portabilidade => "portabilidade",
            TipoProposta::RefinPortabilidade => "refin_portabilidade",
            TipoProposta::RefinCarteira => "refin_carteira",
            TipoProposta::Fgts => "fgts",
            TipoProposta::Clt => "clt",
            TipoProposta::Outros => "outros",
        }
    }

    /// Rótulo exibido nas telas.
    pub fn label(self) -> &'static str {
        match self {
            TipoProposta::Novo => "Novo",
            TipoProposta::Refinanciamento => "Refinanciamento",
            TipoProposta::Portabilidade => "Portabilidade",
            TipoProposta::RefinPortabilidade => "Refin da Portabilidade",
            TipoProposta::RefinCarteira => "Refin de Carteira",
            TipoProposta::Fgts => "FGTS",
            TipoProposta::Clt => "CLT",
            TipoProposta::Outros => "Outros",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TipoPropostaInfo {
    pub code: &'static str,
    pub label: &'static str,
}

// --- PROPOSTA (O Dado) ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Proposta {
    pub id: Uuid,
    pub user_id: Uuid,
    pub numero_proposta: String,
    pub numero_parcelas: i32,
    pub banco: String,
    pub valor: Decimal,
    pub tipo: TipoProposta,

    // Snapshot calculado na criação/atualização; não acompanha a tabela de comissões
    pub comissao: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que o repositório precisa para gravar uma proposta nova
#[derive(Debug, Clone)]
pub struct NovaProposta {
    pub user_id: Uuid,
    pub numero_proposta: String,
    pub numero_parcelas: i32,
    pub banco: String,
    pub valor: Decimal,
    pub tipo: TipoProposta,
    pub comissao: Decimal,
}

// --- ENTRADAS ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropostaInput {
    #[validate(length(min = 1, max = 100, message = "invalid_length"))]
    pub numero_proposta: String,

    #[validate(range(min = 1, message = "invalid_parcelas"))]
    pub numero_parcelas: i32,

    #[validate(length(min = 1, max = 100, message = "invalid_length"))]
    pub banco: String,

    #[validate(regex(path = *MONEY_RE, message = "invalid_money"), custom(function = "validate_valor"))]
    pub valor: String,

    pub tipo: TipoProposta,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropostaInput {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "invalid_length"))]
    pub numero_proposta: Option<String>,

    #[validate(range(min = 1, message = "invalid_parcelas"))]
    pub numero_parcelas: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "invalid_length"))]
    pub banco: Option<String>,

    #[validate(regex(path = *MONEY_RE, message = "invalid_money"), custom(function = "validate_valor"))]
    pub valor: Option<String>,

    pub tipo: Option<TipoProposta>,
}

impl UpdatePropostaInput {
    /// Alterações em valor, banco ou tipo exigem recalcular a comissão.
    pub fn affects_comissao(&self) -> bool {
        self.valor.is_some() || self.banco.is_some() || self.tipo.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct IdInput {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tipo_codes_match_wire_names() {
        for tipo in TipoProposta::ALL {
            let wire = serde_json::to_value(tipo).unwrap();
            assert_eq!(wire, json!(tipo.code()));
        }
    }

    #[test]
    fn unknown_tipo_is_rejected() {
        let parsed = serde_json::from_value::<TipoProposta>(json!("consignado"));
        assert!(parsed.is_err());
    }

    #[test]
    fn create_input_validation() {
        let input: CreatePropostaInput = serde_json::from_value(json!({
            "numeroProposta": "",
            "numeroParcelas": 0,
            "banco": "Caixa",
            "valor": "10.123",
            "tipo": "novo"
        }))
        .unwrap();

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("numero_proposta"));
        assert!(fields.contains_key("numero_parcelas"));
        assert!(fields.contains_key("valor"));
        assert!(!fields.contains_key("banco"));
    }

    #[test]
    fn update_only_recomputes_for_commission_fields() {
        let parcelas_only: UpdatePropostaInput = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "numeroParcelas": 12
        }))
        .unwrap();
        assert!(!parcelas_only.affects_comissao());

        let banco: UpdatePropostaInput = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "banco": "Itaú"
        }))
        .unwrap();
        assert!(banco.affects_comissao());
    }
}
