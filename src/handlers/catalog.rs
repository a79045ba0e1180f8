// src/handlers/catalog.rs

use axum::Json;

use crate::models::proposta::{TipoProposta, TipoPropostaInfo};

// GET /api/tipos (público)
pub async fn list_tipos() -> Json<Vec<TipoPropostaInfo>> {
    let tipos = TipoProposta::ALL
        .iter()
        .map(|tipo| TipoPropostaInfo { code: tipo.code(), label: tipo.label() })
        .collect();
    Json(tipos)
}

// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}
