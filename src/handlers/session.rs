// src/handlers/session.rs
//
// Rotas de apoio: saúde, configuração pública, operador logado,
// listas de apoio e orçamento.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    backend::Resource,
    common::{banner, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermQuotationView, RequirePermission},
    },
    services::auth_context::AuthContext,
};

pub async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub recaptcha_site_key: String,
    pub company_name: String,
}

// Sem autenticação: o formulário público precisa da chave do CAPTCHA.
pub async fn public_config(State(app_state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        recaptcha_site_key: app_state.config.recaptcha_site_key.clone(),
        company_name: app_state.config.company_name.clone(),
    })
}

pub async fn get_me(user: AuthenticatedUser) -> Json<AuthContext> {
    Json(user.context.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Lista separada por vírgula: `rooms,items,trucks`
    pub resources: String,
}

// GET /api/lookups?resources=rooms,items
pub async fn get_lookups(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<LookupQuery>,
) -> Result<Json<BTreeMap<&'static str, Vec<Value>>>, AppError> {
    let resources = query
        .resources
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Resource>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::NotFound(format!("Lookup list '{}'", e.0)))?;

    let api = app_state.api.as_ref();
    let token = &user.token;

    // Todas as listas em paralelo; qualquer falha derruba a página inteira
    let lists = try_join_all(resources.into_iter().map(|resource| async move {
        api.list(token, resource, &[])
            .await
            .map(|rows| (resource.slug(), rows))
    }))
    .await
    .map_err(|e| e.with_banner(banner::FETCH_LOOKUPS))?;

    Ok(Json(lists.into_iter().collect()))
}

// GET /api/quotations/{id}
pub async fn get_quotation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermQuotationView>,
    Path(quotation_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let quotation = app_state
        .api
        .retrieve(&user.token, Resource::QuotationCreate, &quotation_id.to_string())
        .await
        .map_err(|e| e.with_banner(banner::FETCH_QUOTATION))?;
    Ok(Json(quotation))
}
