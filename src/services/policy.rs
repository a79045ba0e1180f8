// src/services/policy.rs
//
// Tabela única de autorização. Todas as entradas (REST e RPC) passam por aqui.

use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Criar proposta própria (qualquer usuário autenticado).
    CreateProposta,
    /// Listar propostas; o escopo (próprias ou todas) é decidido pelo papel.
    ListPropostas,
    /// Alterar ou remover uma proposta existente.
    ModifyProposta { owner_id: Uuid },
    /// Criar, alterar ou remover taxas de comissão.
    ManageComissoes,
    ListComissoesOf { user_id: Uuid },
    ListAllComissoes,
    /// Listar, criar, alterar e remover contas.
    ManageUsers,
}

/// Sem sessão -> `Unauthorized`; sessão sem permissão -> `Forbidden`.
pub fn authorize(caller: Option<&User>, action: Action) -> Result<&User, AppError> {
    let user = caller.ok_or(AppError::Unauthorized)?;
    let admin = user.role.is_admin();

    let allowed = match action {
        Action::CreateProposta | Action::ListPropostas => true,
        Action::ModifyProposta { owner_id } => admin || owner_id == user.id,
        Action::ListComissoesOf { user_id } => admin || user_id == user.id,
        Action::ManageComissoes | Action::ListAllComissoes | Action::ManageUsers => admin,
    };

    if allowed {
        Ok(user)
    } else {
        tracing::warn!(
            user_id = %user.id,
            role = ?user.role,
            action = ?action,
            "Acesso negado"
        );
        Err(AppError::Forbidden)
    }
}
