// src/handlers/documents.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermBookingView, RequirePermission},
    },
    models::booking::Booking,
    services::document_service::{self, confirmation_filename},
};

#[derive(Debug, Serialize)]
pub struct ShareLink {
    pub link: String,
    pub message: String,
}

fn share_link(app_state: &AppState, booking: &Booking) -> Result<ShareLink, AppError> {
    let message = document_service::share_message(booking, &app_state.config.company_name);
    let phone = booking.customer_phone.as_deref().unwrap_or_default();
    let link = document_service::whatsapp_link(phone, &message)?;
    Ok(ShareLink { link, message })
}

fn pdf_response(filename: &str, pdf_bytes: Vec<u8>) -> Response {
    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    (headers, pdf_bytes).into_response()
}

// GET /api/bookings/{id}/confirmation.pdf
pub async fn confirmation_pdf(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermBookingView>,
    Path(booking_id): Path<i64>,
) -> Result<Response, AppError> {
    let booking = app_state
        .booking_service
        .get(&user.context, &user.token, booking_id)
        .await?;

    // Sem telefone o documento sai sem QR code
    let link = share_link(&app_state, &booking).ok().map(|s| s.link);
    let pdf_bytes = app_state
        .document_service
        .confirmation_pdf(&booking, link.as_deref())?;

    Ok(pdf_response(&confirmation_filename(&booking), pdf_bytes))
}

// POST /api/bookings/{id}/confirmation/raster (corpo: PNG ou JPEG da página)
pub async fn confirmation_raster(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermBookingView>,
    Path(booking_id): Path<i64>,
    capture: Bytes,
) -> Result<Response, AppError> {
    let booking = app_state
        .booking_service
        .get(&user.context, &user.token, booking_id)
        .await?;

    let filename = confirmation_filename(&booking);
    let pdf_bytes = app_state.document_service.raster_pdf(&capture, &filename)?;
    Ok(pdf_response(&filename, pdf_bytes))
}

// GET /api/bookings/{id}/share
pub async fn share_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermBookingView>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ShareLink>, AppError> {
    let booking = app_state
        .booking_service
        .get(&user.context, &user.token, booking_id)
        .await?;
    Ok(Json(share_link(&app_state, &booking)?))
}
