// src/middleware/auth.rs

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    backend::BearerToken,
    common::error::AppError,
    config::AppState,
    services::auth_context::AuthContext,
};

/// Operador autenticado: o token (repassado à API) e o contexto de permissões.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub token: BearerToken,
    pub context: Arc<AuthContext>,
}

// O middleware em si
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    let token = BearerToken(bearer.token().to_string());
    let context = app_state
        .auth_cache
        .resolve(app_state.api.as_ref(), &token)
        .await?;

    // Insere o operador nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser { token, context });
    Ok(next.run(request).await)
}

// Extrator para obter o operador autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
