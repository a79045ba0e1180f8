// src/services/comissao_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::parse_money},
    db::{ComissaoRepository, UserRepository},
    models::{
        auth::User,
        comissao::{Comissao, CreateComissaoInput, NovaComissao, UpdateComissaoInput},
    },
    services::policy::{authorize, Action},
};

/// Tabela de taxas de comissão. Mutação e listagem geral são exclusivas de admin.
#[derive(Clone)]
pub struct ComissaoService {
    repo: Arc<dyn ComissaoRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ComissaoService {
    pub fn new(repo: Arc<dyn ComissaoRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, user_repo }
    }

    pub async fn create(
        &self,
        caller: Option<&User>,
        input: CreateComissaoInput,
    ) -> Result<Comissao, AppError> {
        let admin = authorize(caller, Action::ManageComissoes)?;
        input.validate()?;

        if self.user_repo.find_by_id(input.user_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }

        let comissao = self
            .repo
            .create(NovaComissao {
                user_id: input.user_id,
                banco: input.banco,
                tipo: input.tipo,
                percentual: parse_money(&input.percentual)?,
            })
            .await?;

        tracing::info!(
            admin_id = %admin.id,
            comissao_id = %comissao.id,
            user_id = %comissao.user_id,
            banco = %comissao.banco,
            tipo = comissao.tipo.code(),
            percentual = %comissao.percentual,
            "Comissão criada"
        );
        Ok(comissao)
    }

    pub async fn list_by_user(
        &self,
        caller: Option<&User>,
        user_id: Uuid,
    ) -> Result<Vec<Comissao>, AppError> {
        authorize(caller, Action::ListComissoesOf { user_id })?;
        self.repo.list_by_user(user_id).await
    }

    pub async fn list_all(&self, caller: Option<&User>) -> Result<Vec<Comissao>, AppError> {
        authorize(caller, Action::ListAllComissoes)?;
        self.repo.list_all().await
    }

    pub async fn update(
        &self,
        caller: Option<&User>,
        input: UpdateComissaoInput,
    ) -> Result<Comissao, AppError> {
        let admin = authorize(caller, Action::ManageComissoes)?;
        input.validate()?;

        let percentual = input.percentual.as_deref().map(parse_money).transpose()?;

        let comissao = self
            .repo
            .update(input.id, percentual, input.ativo)
            .await?
            .ok_or(AppError::ComissaoNotFound)?;

        tracing::info!(
            admin_id = %admin.id,
            comissao_id = %comissao.id,
            percentual = %comissao.percentual,
            ativo = comissao.ativo,
            "Comissão atualizada"
        );
        Ok(comissao)
    }

    pub async fn delete(&self, caller: Option<&User>, id: Uuid) -> Result<(), AppError> {
        let admin = authorize(caller, Action::ManageComissoes)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::ComissaoNotFound);
        }

        tracing::info!(admin_id = %admin.id, comissao_id = %id, "Comissão removida");
        Ok(())
    }
}
