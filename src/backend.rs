// src/backend.rs
//
// Fronteira com a API REST principal. Os serviços só enxergam o trait,
// assim os testes trocam o cliente HTTP por um backend em memória.

pub mod http_backend;
pub mod resource;

pub use http_backend::HttpBackend;
pub use resource::Resource;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::common::error::AppError;

/// Token do operador, repassado sem alteração para a API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
pub trait BackendApi: Send + Sync {
    /// GET na coleção. Respostas paginadas (`{"results": [...]}`) já chegam desembrulhadas.
    async fn list(
        &self,
        token: &BearerToken,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<Vec<Value>, AppError>;

    async fn retrieve(&self, token: &BearerToken, resource: Resource, id: &str) -> Result<Value, AppError>;

    /// GET num recurso singular, sem id (ex.: `/auth/profile/`).
    async fn fetch(&self, token: &BearerToken, resource: Resource) -> Result<Value, AppError>;

    async fn create(&self, token: &BearerToken, resource: Resource, body: &Value) -> Result<Value, AppError>;

    async fn update(
        &self,
        token: &BearerToken,
        resource: Resource,
        id: &str,
        body: &Value,
    ) -> Result<Value, AppError>;

    async fn delete(&self, token: &BearerToken, resource: Resource, id: &str) -> Result<(), AppError>;
}

// --- Helpers tipados ---

pub async fn list_as<T: DeserializeOwned>(
    api: &dyn BackendApi,
    token: &BearerToken,
    resource: Resource,
    query: &[(&str, String)],
) -> Result<Vec<T>, AppError> {
    let rows = api.list(token, resource, query).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

pub async fn retrieve_as<T: DeserializeOwned>(
    api: &dyn BackendApi,
    token: &BearerToken,
    resource: Resource,
    id: &str,
) -> Result<T, AppError> {
    let value = api.retrieve(token, resource, id).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn fetch_as<T: DeserializeOwned>(
    api: &dyn BackendApi,
    token: &BearerToken,
    resource: Resource,
) -> Result<T, AppError> {
    let value = api.fetch(token, resource).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn create_as<B: Serialize, T: DeserializeOwned>(
    api: &dyn BackendApi,
    token: &BearerToken,
    resource: Resource,
    body: &B,
) -> Result<T, AppError> {
    let body = serde_json::to_value(body)?;
    let value = api.create(token, resource, &body).await?;
    Ok(serde_json::from_value(value)?)
}

pub async fn update_as<B: Serialize, T: DeserializeOwned>(
    api: &dyn BackendApi,
    token: &BearerToken,
    resource: Resource,
    id: &str,
    body: &B,
) -> Result<T, AppError> {
    let body = serde_json::to_value(body)?;
    let value = api.update(token, resource, id, &body).await?;
    Ok(serde_json::from_value(value)?)
}
