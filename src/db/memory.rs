// src/db/memory.rs
//
// Repositórios em memória usados nos testes de serviço e de rotas.
// Reproduzem as restrições do schema (username único, uma comissão
// ativa por chave, FKs com ON DELETE RESTRICT).

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        comissao_repo::ComissaoRepository,
        proposta_repo::PropostaRepository,
        user_repo::{NewUser, UserChanges, UserRepository},
    },
    models::{
        auth::User,
        comissao::{Comissao, NovaComissao},
        proposta::{NovaProposta, Proposta, TipoProposta},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    comissoes: Vec<Comissao>,
    propostas: Vec<Proposta>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

impl Tables {
    fn active_conflict(&self, id: Option<Uuid>, user_id: Uuid, banco: &str, tipo: TipoProposta) -> bool {
        self.comissoes.iter().any(|c| {
            Some(c.id) != id && c.ativo && c.user_id == user_id && c.banco == banco && c.tipo == tipo
        })
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.lock().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::DuplicateUsername);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            role: new_user.role,
            created_at: now,
            updated_at: now,
            last_signed_in: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut tables = self.lock();
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = Some(name);
        }
        if let Some(email) = changes.email {
            user.email = Some(email);
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn touch_last_signed_in(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(user) = self.lock().users.iter_mut().find(|u| u.id == id) {
            user.last_signed_in = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let referenced = tables.propostas.iter().any(|p| p.user_id == id)
            || tables.comissoes.iter().any(|c| c.user_id == id);
        if referenced {
            return Err(AppError::UserHasDependents);
        }
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() < before)
    }
}

#[async_trait]
impl ComissaoRepository for MemoryStore {
    async fn create(&self, nova: NovaComissao) -> Result<Comissao, AppError> {
        let mut tables = self.lock();
        if !tables.users.iter().any(|u| u.id == nova.user_id) {
            return Err(AppError::UserNotFound);
        }
        if tables.active_conflict(None, nova.user_id, &nova.banco, nova.tipo) {
            return Err(AppError::DuplicateCommissionRate);
        }
        let now = Utc::now();
        let comissao = Comissao {
            id: Uuid::new_v4(),
            user_id: nova.user_id,
            banco: nova.banco,
            tipo: nova.tipo,
            percentual: nova.percentual,
            ativo: true,
            created_at: now,
            updated_at: now,
        };
        tables.comissoes.push(comissao.clone());
        Ok(comissao)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Comissao>, AppError> {
        Ok(self
            .lock()
            .comissoes
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Comissao>, AppError> {
        Ok(self.lock().comissoes.clone())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        banco: &str,
        tipo: TipoProposta,
    ) -> Result<Option<Comissao>, AppError> {
        Ok(self
            .lock()
            .comissoes
            .iter()
            .find(|c| c.ativo && c.user_id == user_id && c.banco == banco && c.tipo == tipo)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        percentual: Option<Decimal>,
        ativo: Option<bool>,
    ) -> Result<Option<Comissao>, AppError> {
        let mut tables = self.lock();
        let Some(current) = tables.comissoes.iter().find(|c| c.id == id).cloned() else {
            return Ok(None);
        };
        if ativo == Some(true)
            && tables.active_conflict(Some(id), current.user_id, &current.banco, current.tipo)
        {
            return Err(AppError::DuplicateCommissionRate);
        }
        let Some(comissao) = tables.comissoes.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(p) = percentual {
            comissao.percentual = p;
        }
        if let Some(a) = ativo {
            comissao.ativo = a;
        }
        comissao.updated_at = Utc::now();
        Ok(Some(comissao.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.comissoes.len();
        tables.comissoes.retain(|c| c.id != id);
        Ok(tables.comissoes.len() < before)
    }
}

#[async_trait]
impl PropostaRepository for MemoryStore {
    async fn create(&self, nova: NovaProposta) -> Result<Proposta, AppError> {
        let now = Utc::now();
        let proposta = Proposta {
            id: Uuid::new_v4(),
            user_id: nova.user_id,
            numero_proposta: nova.numero_proposta,
            numero_parcelas: nova.numero_parcelas,
            banco: nova.banco,
            valor: nova.valor,
            tipo: nova.tipo,
            comissao: nova.comissao,
            created_at: now,
            updated_at: now,
        };
        self.lock().propostas.push(proposta.clone());
        Ok(proposta)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Proposta>, AppError> {
        Ok(self.lock().propostas.iter().find(|p| p.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Proposta>, AppError> {
        Ok(self
            .lock()
            .propostas
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Proposta>, AppError> {
        Ok(self.lock().propostas.iter().rev().cloned().collect())
    }

    async fn update(&self, proposta: &Proposta) -> Result<Option<Proposta>, AppError> {
        let mut tables = self.lock();
        let Some(stored) = tables.propostas.iter_mut().find(|p| p.id == proposta.id) else {
            return Ok(None);
        };
        stored.numero_proposta = proposta.numero_proposta.clone();
        stored.numero_parcelas = proposta.numero_parcelas;
        stored.banco = proposta.banco.clone();
        stored.valor = proposta.valor;
        stored.tipo = proposta.tipo;
        stored.comissao = proposta.comissao;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let before = tables.propostas.len();
        tables.propostas.retain(|p| p.id != id);
        Ok(tables.propostas.len() < before)
    }
}
