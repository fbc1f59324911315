// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    backend::{BackendApi, HttpBackend},
    services::{
        auth_context::AuthContextCache, booking_service::BookingService,
        document_service::DocumentService, survey_service::SurveyService,
    },
};

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub recaptcha_site_key: String,
    pub bind_addr: String,
    pub fonts_dir: String,
    pub font_family: String,
    pub company_name: String,
    pub http_timeout: Duration,
    pub auth_cache_ttl: Duration,
    pub wizard_session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL").context("API_BASE_URL deve ser definida")?;
        let recaptcha_site_key =
            env::var("RECAPTCHA_SITE_KEY").context("RECAPTCHA_SITE_KEY deve ser definida")?;

        Ok(Self {
            api_base_url,
            recaptcha_site_key,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            fonts_dir: var_or("FONTS_DIR", "./fonts"),
            font_family: var_or("FONT_FAMILY", "Roboto"),
            company_name: var_or("COMPANY_NAME", "Relocation Services"),
            http_timeout: Duration::from_secs(secs_or("HTTP_TIMEOUT_SECS", 30)?),
            auth_cache_ttl: Duration::from_secs(secs_or("AUTH_CACHE_TTL_SECS", 300)?),
            wizard_session_ttl: Duration::from_secs(secs_or("WIZARD_SESSION_TTL_SECS", 3600)?),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn secs_or(name: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} deve ser um número de segundos, veio '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: Arc<dyn BackendApi>,
    pub auth_cache: AuthContextCache,
    pub survey_service: SurveyService,
    pub booking_service: BookingService,
    pub document_service: DocumentService,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let api = HttpBackend::new(&config.api_base_url, config.http_timeout)
            .context("Falha ao criar o cliente HTTP")?;
        tracing::info!("✅ API principal configurada em {}", config.api_base_url);
        Ok(Self::with_backend(config, Arc::new(api)))
    }

    /// Monta o gráfico de dependências sobre qualquer backend (testes usam um em memória).
    pub fn with_backend(config: AppConfig, api: Arc<dyn BackendApi>) -> Self {
        Self {
            auth_cache: AuthContextCache::new(config.auth_cache_ttl),
            survey_service: SurveyService::new(api.clone(), config.wizard_session_ttl),
            booking_service: BookingService::new(api.clone()),
            document_service: DocumentService::new(
                config.fonts_dir.as_str(),
                &config.font_family,
                &config.company_name,
            ),
            config: Arc::new(config),
            api,
        }
    }
}
