// src/handlers/surveys.rs
//
// Formulário de vistoria em abas. Cada request mexe numa sessão do servidor;
// só `submit` fala com a API para gravar.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermSurveyView, RequirePermission},
    },
    models::survey::{AddressFields, ArticleForm, PetFields},
    services::{
        forms::{self, FieldSpec},
        survey_service::SurveySummary,
        wizard::{BackOutcome, DraftUpdate, SurveyWizard},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSurveyPayload {
    pub enquiry_id: i64,
}

/// Resposta de uma ação que cria uma entrada: o id temporário + o estado atual.
#[derive(Debug, Serialize)]
pub struct EntryCreated {
    pub id: Uuid,
    pub wizard: SurveyWizard,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    #[serde(flatten)]
    pub outcome: BackOutcome,
    pub wizard: SurveyWizard,
}

pub async fn form_schema() -> Json<Vec<FieldSpec>> {
    Json(forms::service_tab_fields())
}

// POST /api/surveys/sessions
pub async fn open_survey(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<OpenSurveyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let wizard = app_state
        .survey_service
        .open(&user.context, &user.token, payload.enquiry_id)
        .await?;
    Ok((StatusCode::CREATED, Json(wizard)))
}

pub async fn get_survey(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermSurveyView>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SurveyWizard>, AppError> {
    Ok(Json(app_state.survey_service.get(&user.context, session_id).await?))
}

pub async fn close_survey(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.survey_service.close(&user.context, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/surveys/sessions/{session_id}/draft
pub async fn update_draft(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
    Json(update): Json<DraftUpdate>,
) -> Result<Json<SurveyWizard>, AppError> {
    let ((), wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| {
            w.apply_update(update);
            Ok(())
        })
        .await?;
    Ok(Json(wizard))
}

// POST /api/surveys/sessions/{session_id}/next
pub async fn next_tab(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SurveyWizard>, AppError> {
    let (_, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.advance())
        .await?;
    Ok(Json(wizard))
}

// POST /api/surveys/sessions/{session_id}/back
pub async fn previous_tab(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<BackResponse>, AppError> {
    let (outcome, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| Ok(w.back()))
        .await?;
    Ok(Json(BackResponse { outcome, wizard }))
}

// --- Endereços de destino ---

pub async fn add_destination(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (id, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| Ok(w.add_destination()))
        .await?;
    Ok((StatusCode::CREATED, Json(EntryCreated { id, wizard })))
}

pub async fn update_destination(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
    Json(fields): Json<AddressFields>,
) -> Result<Json<SurveyWizard>, AppError> {
    let (_, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.update_destination(entry_id, fields))
        .await?;
    Ok(Json(wizard))
}

pub async fn remove_destination(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SurveyWizard>, AppError> {
    let (_, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.remove_destination(entry_id))
        .await?;
    Ok(Json(wizard))
}

// --- Artigos e pets ---

pub async fn add_article(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
    Json(form): Json<ArticleForm>,
) -> Result<impl IntoResponse, AppError> {
    let (id, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.add_article(form))
        .await?;
    Ok((StatusCode::CREATED, Json(EntryCreated { id, wizard })))
}

pub async fn remove_article(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SurveyWizard>, AppError> {
    let (_, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.remove_article(entry_id))
        .await?;
    Ok(Json(wizard))
}

pub async fn add_pet(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
    Json(fields): Json<PetFields>,
) -> Result<impl IntoResponse, AppError> {
    let (id, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.add_pet(fields))
        .await?;
    Ok((StatusCode::CREATED, Json(EntryCreated { id, wizard })))
}

pub async fn remove_pet(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path((session_id, entry_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SurveyWizard>, AppError> {
    let (_, wizard) = app_state
        .survey_service
        .mutate(&user.context, session_id, |w| w.remove_pet(entry_id))
        .await?;
    Ok(Json(wizard))
}

// POST /api/surveys/sessions/{session_id}/submit
pub async fn submit_survey(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SurveySummary>, AppError> {
    let summary = app_state
        .survey_service
        .submit(&user.context, &user.token, session_id)
        .await?;
    Ok(Json(summary))
}
