// src/handlers/bookings.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::{banner::Banner, error::AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermBookingDelete, PermBookingView, RequirePermission},
    },
    models::booking::{Booking, BookingUpdatePayload},
    services::booking_service::BookingSaved,
};

pub async fn get_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermBookingView>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = app_state
        .booking_service
        .get(&user.context, &user.token, booking_id)
        .await?;
    Ok(Json(booking))
}

// PUT /api/bookings/{id}: reserva + alocações numa só ação
pub async fn update_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<i64>,
    Json(payload): Json<BookingUpdatePayload>,
) -> Result<Json<BookingSaved>, AppError> {
    let saved = app_state
        .booking_service
        .save(&user.context, &user.token, booking_id, payload)
        .await?;
    Ok(Json(saved))
}

pub async fn delete_booking(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermBookingDelete>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Banner>, AppError> {
    let banner = app_state
        .booking_service
        .delete(&user.context, &user.token, booking_id)
        .await?;
    Ok(Json(banner))
}
