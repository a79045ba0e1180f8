// src/handlers/rpc.rs
//
// Superfície RPC tipada: GET para consultas, POST para mutações.
// Sucesso: {"result": {"data": ...}}. Falha: {"error": {"code", "message"}}.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{removal_cookie, Caller},
        i18n::Locale,
    },
    models::{
        auth::{PublicUser, User},
        comissao::{CreateComissaoInput, UpdateComissaoInput, UserIdInput},
        proposta::{IdInput, UpdatePropostaInput},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    AuthMe,
    AuthLogout,
    PropostasCreate,
    PropostasList,
    PropostasUpdate,
    PropostasDelete,
    ComissoesCreate,
    ComissoesListByUser,
    ComissoesListAll,
    ComissoesUpdate,
    ComissoesDelete,
    UsersListAll,
}

impl Procedure {
    pub fn parse(name: &str) -> Option<Self> {
        let procedure = match name {
            "auth.me" => Procedure::AuthMe,
            "auth.logout" => Procedure::AuthLogout,
            "propostas.create" => Procedure::PropostasCreate,
            "propostas.list" => Procedure::PropostasList,
            "propostas.update" => Procedure::PropostasUpdate,
            "propostas.delete" => Procedure::PropostasDelete,
            "comissoes.create" => Procedure::ComissoesCreate,
            "comissoes.listByUser" => Procedure::ComissoesListByUser,
            "comissoes.listAll" => Procedure::ComissoesListAll,
            "comissoes.update" => Procedure::ComissoesUpdate,
            "comissoes.delete" => Procedure::ComissoesDelete,
            "users.listAll" => Procedure::UsersListAll,
            _ => return None,
        };
        Some(procedure)
    }

    pub fn is_query(self) -> bool {
        matches!(
            self,
            Procedure::AuthMe
                | Procedure::PropostasList
                | Procedure::ComissoesListByUser
                | Procedure::ComissoesListAll
                | Procedure::UsersListAll
        )
    }

    // A sessão é verificada antes da leitura do input
    fn requires_session(self) -> bool {
        !matches!(self, Procedure::AuthMe | Procedure::AuthLogout)
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    pub input: Option<String>,
}

// GET /api/trpc/{procedure}?input=<json>
pub async fn query(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    locale: Locale,
    Caller(caller): Caller,
    Query(params): Query<RpcQuery>,
) -> Response {
    let result = async {
        let procedure = lookup(&name, true)?;
        let input = match params.input.as_deref() {
            Some(raw) if !raw.is_empty() => Some(
                serde_json::from_str(raw).map_err(|e| AppError::InvalidBody(e.to_string()))?,
            ),
            _ => None,
        };
        dispatch(&app_state, procedure, caller.as_ref(), input).await
    }
    .await;

    respond(result, &app_state, &locale)
}

// POST /api/trpc/{procedure}
pub async fn mutation(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    locale: Locale,
    Caller(caller): Caller,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let procedure = match lookup(&name, false) {
        Ok(procedure) => procedure,
        Err(e) => return respond(Err(e), &app_state, &locale),
    };

    let result = async {
        let input = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?)
        };
        dispatch(&app_state, procedure, caller.as_ref(), input).await
    }
    .await;

    if procedure == Procedure::AuthLogout && result.is_ok() {
        let jar = jar.add(removal_cookie(app_state.config.cookie_secure));
        return (jar, respond(result, &app_state, &locale)).into_response();
    }
    respond(result, &app_state, &locale)
}

fn lookup(name: &str, as_query: bool) -> Result<Procedure, AppError> {
    let procedure =
        Procedure::parse(name).ok_or_else(|| AppError::UnknownProcedure(name.to_string()))?;
    if procedure.is_query() != as_query {
        return Err(AppError::MethodNotSupported);
    }
    Ok(procedure)
}

async fn dispatch(
    state: &AppState,
    procedure: Procedure,
    caller: Option<&User>,
    input: Option<Value>,
) -> Result<Value, AppError> {
    if procedure.requires_session() && caller.is_none() {
        return Err(AppError::Unauthorized);
    }

    match procedure {
        Procedure::AuthMe => data(caller.map(PublicUser::from)),
        Procedure::AuthLogout => Ok(json!({ "success": true })),

        Procedure::PropostasCreate => {
            data(state.proposta_service.create(caller, parse_input(input)?).await?)
        }
        Procedure::PropostasList => data(state.proposta_service.list(caller).await?),
        Procedure::PropostasUpdate => {
            let update: UpdatePropostaInput = parse_input(input)?;
            data(state.proposta_service.update(caller, update).await?)
        }
        Procedure::PropostasDelete => {
            let IdInput { id } = parse_input(input)?;
            state.proposta_service.delete(caller, id).await?;
            Ok(json!({ "success": true }))
        }

        Procedure::ComissoesCreate => {
            let nova: CreateComissaoInput = parse_input(input)?;
            data(state.comissao_service.create(caller, nova).await?)
        }
        Procedure::ComissoesListByUser => {
            let UserIdInput { user_id } = parse_input(input)?;
            data(state.comissao_service.list_by_user(caller, user_id).await?)
        }
        Procedure::ComissoesListAll => data(state.comissao_service.list_all(caller).await?),
        Procedure::ComissoesUpdate => {
            let update: UpdateComissaoInput = parse_input(input)?;
            data(state.comissao_service.update(caller, update).await?)
        }
        Procedure::ComissoesDelete => {
            let IdInput { id } = parse_input(input)?;
            state.comissao_service.delete(caller, id).await?;
            Ok(json!({ "success": true }))
        }

        Procedure::UsersListAll => data(state.user_service.list_users(caller).await?),
    }
}

fn parse_input<T: DeserializeOwned>(input: Option<Value>) -> Result<T, AppError> {
    serde_json::from_value(input.unwrap_or(Value::Null))
        .map_err(|e| AppError::InvalidBody(e.to_string()))
}

fn data<T: Serialize>(value: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value).map_err(anyhow::Error::from)?)
}

fn respond(result: Result<Value, AppError>, state: &AppState, locale: &Locale) -> Response {
    match result {
        Ok(value) => Json(json!({ "result": { "data": value } })).into_response(),
        Err(e) => {
            let api = e.to_api_error(locale, &state.i18n_store);
            let mut error = json!({ "code": api.code, "message": api.error });
            if let Some(details) = api.details {
                error["details"] = details;
            }
            (api.status, Json(json!({ "error": error }))).into_response()
        }
    }
}
