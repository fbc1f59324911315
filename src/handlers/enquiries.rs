// src/handlers/enquiries.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    backend::{self, Resource},
    common::{
        banner::{self, Banner},
        error::AppError,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermEnquiryAdd, PermEnquiryView, RequirePermission},
    },
    models::enquiry::{CreateEnquiryPayload, Enquiry, NewEnquiry},
    services::listing::{EnquiryFilter, Page, Pagination},
};

// GET /api/enquiries?search=&status=&page=&pageSize=
pub async fn list_enquiries(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEnquiryView>,
    Query(filter): Query<EnquiryFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<Enquiry>>, AppError> {
    pagination.validate()?;

    let enquiries: Vec<Enquiry> =
        backend::list_as(app_state.api.as_ref(), &user.token, Resource::Enquiries, &[])
            .await
            .map_err(|e| e.with_banner(banner::FETCH_ENQUIRIES))?;

    Ok(Json(pagination.paginate(filter.apply(enquiries))))
}

// POST /api/enquiries
pub async fn create_enquiry(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEnquiryAdd>,
    Json(payload): Json<CreateEnquiryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.captcha_token.trim().is_empty() {
        return Err(AppError::CaptchaMissing);
    }

    let body = serde_json::to_value(NewEnquiry::from(&payload))?;
    let created: Value = app_state
        .api
        .create(&user.token, Resource::Enquiries, &body)
        .await
        .map_err(|e| e.with_banner(banner::SAVE_ENQUIRY))?;

    tracing::info!("Nova solicitação registrada por {}", user.context.profile.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "enquiry": created, "banner": Banner::success(banner::ENQUIRY_SAVED) })),
    ))
}
