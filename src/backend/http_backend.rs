// src/backend/http_backend.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    backend::{BackendApi, BearerToken, Resource},
    common::error::AppError,
};

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Cliente reqwest para a API REST principal.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: &BearerToken) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("[Api] {} {}", method, url);
        self.client.request(method, url).bearer_auth(token.as_str())
    }

    /// Lê o corpo; status de erro vira `AppError::Upstream` com a melhor mensagem disponível.
    async fn parse_response(&self, response: reqwest::Response) -> Result<Value, AppError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.detail.or(e.message).or(e.error))
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(AppError::Upstream {
                status: status.as_u16(),
                detail,
                banner: None,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn list(
        &self,
        token: &BearerToken,
        resource: Resource,
        query: &[(&str, String)],
    ) -> Result<Vec<Value>, AppError> {
        let response = self
            .request(Method::GET, resource.path(), token)
            .query(query)
            .send()
            .await?;

        match self.parse_response(response).await? {
            Value::Array(rows) => Ok(rows),
            Value::Object(mut page) => match page.remove("results") {
                Some(Value::Array(rows)) => Ok(rows),
                _ => Err(AppError::Upstream {
                    status: 502,
                    detail: format!("{} did not return a list", resource),
                    banner: None,
                }),
            },
            Value::Null => Ok(Vec::new()),
            _ => Err(AppError::Upstream {
                status: 502,
                detail: format!("{} did not return a list", resource),
                banner: None,
            }),
        }
    }

    async fn retrieve(&self, token: &BearerToken, resource: Resource, id: &str) -> Result<Value, AppError> {
        let response = self
            .request(Method::GET, &resource.item_path(id), token)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn fetch(&self, token: &BearerToken, resource: Resource) -> Result<Value, AppError> {
        let response = self.request(Method::GET, resource.path(), token).send().await?;
        self.parse_response(response).await
    }

    async fn create(&self, token: &BearerToken, resource: Resource, body: &Value) -> Result<Value, AppError> {
        let response = self
            .request(Method::POST, resource.path(), token)
            .json(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn update(
        &self,
        token: &BearerToken,
        resource: Resource,
        id: &str,
        body: &Value,
    ) -> Result<Value, AppError> {
        let response = self
            .request(Method::PUT, &resource.item_path(id), token)
            .json(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn delete(&self, token: &BearerToken, resource: Resource, id: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, &resource.item_path(id), token)
            .send()
            .await?;
        self.parse_response(response).await.map(|_| ())
    }
}
