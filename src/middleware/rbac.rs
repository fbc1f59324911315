// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    services::auth_context::Action,
};

/// 1. O Trait que define o que é uma Permissão: página do console + ação
pub trait PermissionDef: Send + Sync + 'static {
    fn resource() -> &'static str;
    fn action() -> Action;
}

/// 2. O Extractor (Guardião). Nega antes de qualquer chamada à API.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai o operador (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Consulta as flags do cargo
        user.context.require(T::resource(), T::action())?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $resource:literal, $action:expr) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn resource() -> &'static str {
                $resource
            }
            fn action() -> Action {
                $action
            }
        }
    };
}

permission!(PermSurveyView, "survey", Action::View);
permission!(PermEnquiryView, "enquiry", Action::View);
permission!(PermEnquiryAdd, "enquiry", Action::Add);
permission!(PermBookingView, "booking", Action::View);
permission!(PermBookingDelete, "booking", Action::Delete);
permission!(PermQuotationView, "quotation", Action::View);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::BearerToken,
        models::{
            auth::Profile,
            rbac::{PagePermission, Role},
        },
        services::auth_context::AuthContext,
    };
    use axum::http::Request;
    use std::sync::Arc;

    fn parts_for(permissions: Vec<PagePermission>) -> Parts {
        let profile = Profile { id: 1, name: None, email: "a@b.co".into(), role: Some(1), is_superuser: false };
        let role = Role { id: 1, name: "Viewer".into(), description: None, permissions };
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(AuthenticatedUser {
            token: BearerToken("t".into()),
            context: Arc::new(AuthContext::new(profile, Some(role))),
        });
        parts
    }

    #[tokio::test]
    async fn grants_when_flag_is_set() {
        let mut parts = parts_for(vec![PagePermission {
            page: "booking".into(),
            can_view: true,
            ..Default::default()
        }]);
        let result = RequirePermission::<PermBookingView>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn denies_missing_flag() {
        let mut parts = parts_for(vec![PagePermission {
            page: "booking".into(),
            can_view: true,
            ..Default::default()
        }]);
        let result = RequirePermission::<PermBookingDelete>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden { action: Action::Delete, .. })));
    }

    #[tokio::test]
    async fn unauthenticated_request_is_rejected() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = RequirePermission::<PermSurveyView>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
