// src/services/proposta_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, money::parse_money},
    db::PropostaRepository,
    models::{
        auth::User,
        proposta::{CreatePropostaInput, NovaProposta, Proposta, UpdatePropostaInput},
    },
    services::{
        policy::{authorize, Action},
        resolver::CommissionResolver,
    },
};

#[derive(Clone)]
pub struct PropostaService {
    repo: Arc<dyn PropostaRepository>,
    resolver: CommissionResolver,
}

impl PropostaService {
    pub fn new(repo: Arc<dyn PropostaRepository>, resolver: CommissionResolver) -> Self {
        Self { repo, resolver }
    }

    /// Registra a proposta do usuário logado com a comissão calculada no momento.
    pub async fn create(
        &self,
        caller: Option<&User>,
        input: CreatePropostaInput,
    ) -> Result<Proposta, AppError> {
        let owner = authorize(caller, Action::CreateProposta)?;
        input.validate()?;

        let valor = parse_money(&input.valor)?;
        let comissao = self
            .resolver
            .commission_for(owner.id, &input.banco, input.tipo, valor)
            .await?;

        let proposta = self
            .repo
            .create(NovaProposta {
                user_id: owner.id,
                numero_proposta: input.numero_proposta,
                numero_parcelas: input.numero_parcelas,
                banco: input.banco,
                valor,
                tipo: input.tipo,
                comissao,
            })
            .await?;

        tracing::info!(
            proposta_id = %proposta.id,
            user_id = %owner.id,
            valor = %proposta.valor,
            comissao = %proposta.comissao,
            "Proposta registrada"
        );
        Ok(proposta)
    }

    /// Admin vê todas as propostas; os demais, apenas as próprias.
    pub async fn list(&self, caller: Option<&User>) -> Result<Vec<Proposta>, AppError> {
        let user = authorize(caller, Action::ListPropostas)?;
        if user.role.is_admin() {
            self.repo.list_all().await
        } else {
            self.repo.list_by_user(user.id).await
        }
    }

    pub async fn update(
        &self,
        caller: Option<&User>,
        input: UpdatePropostaInput,
    ) -> Result<Proposta, AppError> {
        let mut proposta = self.find_modifiable(caller, input.id).await?;
        input.validate()?;
        let recompute = input.affects_comissao();

        if let Some(numero) = input.numero_proposta {
            proposta.numero_proposta = numero;
        }
        if let Some(parcelas) = input.numero_parcelas {
            proposta.numero_parcelas = parcelas;
        }
        if let Some(banco) = input.banco {
            proposta.banco = banco;
        }
        if let Some(valor) = input.valor.as_deref() {
            proposta.valor = parse_money(valor)?;
        }
        if let Some(tipo) = input.tipo {
            proposta.tipo = tipo;
        }

        // A taxa é sempre a do dono da proposta, mesmo quando quem edita é um admin
        if recompute {
            proposta.comissao = self
                .resolver
                .commission_for(proposta.user_id, &proposta.banco, proposta.tipo, proposta.valor)
                .await?;
        }

        let updated = self
            .repo
            .update(&proposta)
            .await?
            .ok_or(AppError::PropostaNotFound)?;

        tracing::info!(
            proposta_id = %updated.id,
            recalculada = recompute,
            comissao = %updated.comissao,
            "Proposta atualizada"
        );
        Ok(updated)
    }

    pub async fn delete(&self, caller: Option<&User>, id: Uuid) -> Result<(), AppError> {
        let proposta = self.find_modifiable(caller, id).await?;

        if !self.repo.delete(proposta.id).await? {
            return Err(AppError::PropostaNotFound);
        }

        tracing::info!(proposta_id = %id, "Proposta removida");
        Ok(())
    }

    // Sessão primeiro, depois existência, depois dono/admin.
    async fn find_modifiable(&self, caller: Option<&User>, id: Uuid) -> Result<Proposta, AppError> {
        caller.ok_or(AppError::Unauthorized)?;

        let proposta = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::PropostaNotFound)?;

        authorize(caller, Action::ModifyProposta { owner_id: proposta.user_id })?;
        Ok(proposta)
    }
}
