// src/services/auth_context.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    backend::{self, BackendApi, BearerToken, Resource},
    common::{banner, error::AppError},
    models::{
        auth::Profile,
        rbac::{PagePermission, Role},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Add,
    Edit,
    Delete,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Quem está logado e o que pode fazer. Montado uma vez por token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub profile: Profile,
    pub role_name: Option<String>,
    permissions: HashMap<String, PagePermission>,
}

impl AuthContext {
    pub fn new(profile: Profile, role: Option<Role>) -> Self {
        let role_name = role.as_ref().map(|r| r.name.clone());
        let permissions = role
            .map(|r| {
                r.permissions
                    .into_iter()
                    .map(|p| (p.page.to_lowercase(), p))
                    .collect()
            })
            .unwrap_or_default();

        Self { profile, role_name, permissions }
    }

    pub fn has_permission(&self, resource: &str, action: Action) -> bool {
        if self.profile.is_superuser {
            return true;
        }
        let Some(page) = self.permissions.get(&resource.to_lowercase()) else {
            return false;
        };
        match action {
            Action::View => page.can_view,
            Action::Add => page.can_add,
            Action::Edit => page.can_edit,
            Action::Delete => page.can_delete,
        }
    }

    /// Falha com `Forbidden` antes de qualquer chamada à API.
    pub fn require(&self, resource: &str, action: Action) -> Result<(), AppError> {
        if self.has_permission(resource, action) {
            Ok(())
        } else {
            Err(AppError::Forbidden { resource: resource.to_string(), action })
        }
    }
}

struct CachedContext {
    context: Arc<AuthContext>,
    fetched_at: Instant,
}

/// Cache de contextos por token, para não buscar perfil/cargo a cada requisição.
#[derive(Clone)]
pub struct AuthContextCache {
    entries: Arc<RwLock<HashMap<BearerToken, CachedContext>>>,
    ttl: Duration,
}

impl AuthContextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn resolve(
        &self,
        api: &dyn BackendApi,
        token: &BearerToken,
    ) -> Result<Arc<AuthContext>, AppError> {
        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(token) {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.context.clone());
                }
            }
        }

        let context = Arc::new(load_context(api, token).await?);

        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.fetched_at.elapsed() < self.ttl);
        entries.insert(
            token.clone(),
            CachedContext { context: context.clone(), fetched_at: Instant::now() },
        );
        Ok(context)
    }
}

async fn load_context(api: &dyn BackendApi, token: &BearerToken) -> Result<AuthContext, AppError> {
    // 401 da API = token inválido para nós também
    let profile: Profile = match backend::fetch_as(api, token, Resource::Profile).await {
        Ok(profile) => profile,
        Err(AppError::Upstream { status: 401 | 403, .. }) => return Err(AppError::InvalidToken),
        Err(e) => return Err(e.with_banner(banner::FETCH_PROFILE)),
    };

    // O cargo depende do perfil, então as duas buscas são sequenciais.
    let role = match profile.role {
        Some(role_id) => Some(
            backend::retrieve_as::<Role>(api, token, Resource::Roles, &role_id.to_string())
                .await
                .map_err(|e| e.with_banner(banner::FETCH_PROFILE))?,
        ),
        None => None,
    };

    tracing::debug!(
        "Contexto carregado para {} (cargo: {:?})",
        profile.email,
        role.as_ref().map(|r| r.name.as_str())
    );
    Ok(AuthContext::new(profile, role))
}
