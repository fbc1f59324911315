// src/services/survey_service.rs
//
// Sessões do formulário de vistoria (uma por aba aberta no navegador)
// e as chamadas à API que abrem e enviam o rascunho.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    backend::{self, BackendApi, BearerToken, Resource},
    common::{
        banner::{self, Banner},
        error::AppError,
    },
    models::{
        catalog::{CatalogItem, Room},
        enquiry::Enquiry,
        survey::{GoodsType, SurveyDraft},
    },
    services::{
        auth_context::{Action, AuthContext},
        survey_codec::{self, SurveyPayload},
        wizard::{SurveyWizard, WizardError},
    },
};

const SURVEY_PAGE: &str = "survey";

/// Resumo exibido depois do envio bem-sucedido.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub survey_id: Option<i64>,
    pub enquiry_id: i64,
    pub customer_name: String,
    pub goods_type: Option<GoodsType>,
    pub destination_count: usize,
    pub item_count: usize,
    pub created: bool,
    pub banner: Banner,
}

#[derive(Clone)]
pub struct SurveyService {
    api: Arc<dyn BackendApi>,
    sessions: Arc<RwLock<HashMap<Uuid, SurveyWizard>>>,
    session_ttl: Duration,
}

impl SurveyService {
    pub fn new(api: Arc<dyn BackendApi>, session_ttl: Duration) -> Self {
        Self {
            api,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl,
        }
    }

    /// Abre o formulário para uma solicitação: vistoria salva (se houver),
    /// cômodos, catálogo e a própria solicitação chegam em paralelo.
    pub async fn open(
        &self,
        ctx: &AuthContext,
        token: &BearerToken,
        enquiry_id: i64,
    ) -> Result<SurveyWizard, AppError> {
        ctx.require(SURVEY_PAGE, Action::View)?;
        let api = self.api.as_ref();
        let enquiry_key = enquiry_id.to_string();

        let (existing, rooms, catalog, enquiry) = tokio::try_join!(
            async {
                backend::list_as::<SurveyPayload>(
                    api,
                    token,
                    Resource::Surveys,
                    &[("enquiry", enquiry_key.clone())],
                )
                .await
                .map_err(|e| e.with_banner(banner::FETCH_SURVEY))
            },
            async {
                backend::list_as::<Room>(api, token, Resource::Rooms, &[])
                    .await
                    .map_err(|e| e.with_banner(banner::FETCH_LOOKUPS))
            },
            async {
                backend::list_as::<CatalogItem>(api, token, Resource::Items, &[])
                    .await
                    .map_err(|e| e.with_banner(banner::FETCH_LOOKUPS))
            },
            async {
                backend::retrieve_as::<Enquiry>(api, token, Resource::Enquiries, &enquiry_key)
                    .await
                    .map_err(|e| e.with_banner(banner::FETCH_SURVEY))
            },
        )?;

        // A API pode devolver vistorias de outra solicitação se ignorar o filtro.
        let saved = existing.into_iter().find(|s| s.enquiry == enquiry_id);
        let draft = match saved {
            Some(payload) => {
                tracing::debug!("Hidratando vistoria {:?} da solicitação {}", payload.id, enquiry_id);
                survey_codec::from_payload(payload)
            }
            None => draft_from_enquiry(&enquiry),
        };

        let wizard = SurveyWizard::new(ctx.profile.id, draft, rooms, catalog)
            .with_enquiry_address(enquiry.address.clone());

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, w| w.is_submitting() || w.idle_for() < self.session_ttl);
        sessions.insert(wizard.session_id, wizard.clone());
        tracing::info!(
            "Formulário de vistoria aberto: sessão {} (solicitação {})",
            wizard.session_id,
            enquiry_id
        );
        Ok(wizard)
    }

    pub async fn get(&self, ctx: &AuthContext, session_id: Uuid) -> Result<SurveyWizard, AppError> {
        let sessions = self.sessions.read().await;
        let wizard = sessions.get(&session_id).ok_or(AppError::SessionNotFound)?;
        if wizard.owner != ctx.profile.id {
            return Err(AppError::SessionNotFound);
        }
        Ok(wizard.clone())
    }

    /// Aplica uma mudança síncrona na sessão. O lock não atravessa nenhum await.
    pub async fn mutate<R>(
        &self,
        ctx: &AuthContext,
        session_id: Uuid,
        change: impl FnOnce(&mut SurveyWizard) -> Result<R, WizardError>,
    ) -> Result<(R, SurveyWizard), AppError> {
        let mut sessions = self.sessions.write().await;
        let wizard = sessions
            .get_mut(&session_id)
            .filter(|w| w.owner == ctx.profile.id)
            .ok_or(AppError::SessionNotFound)?;

        wizard.ensure_editable()?;
        wizard.touch();
        let outcome = change(wizard)?;
        Ok((outcome, wizard.clone()))
    }

    /// Envio final: cria ou atualiza a vistoria num único request.
    /// Em caso de falha a sessão continua aberta, com todos os dados.
    /// Enquanto o request está em andamento a sessão fica travada: um segundo
    /// envio ou qualquer edição recebe `SubmitInProgress`.
    pub async fn submit(
        &self,
        ctx: &AuthContext,
        token: &BearerToken,
        session_id: Uuid,
    ) -> Result<SurveySummary, AppError> {
        let (payload, survey_id) = {
            let mut sessions = self.sessions.write().await;
            let wizard = sessions
                .get_mut(&session_id)
                .filter(|w| w.owner == ctx.profile.id)
                .ok_or(AppError::SessionNotFound)?;
            wizard.ensure_editable()?;
            let survey_id = wizard.draft.survey_id;

            // 1. Permissão antes de qualquer request
            let action = if survey_id.is_some() { Action::Edit } else { Action::Add };
            ctx.require(SURVEY_PAGE, action)?;

            // 2. Validação completa
            let payload = wizard.prepare_submission()?;
            wizard.set_submitting(true);
            wizard.touch();
            (payload, survey_id)
        };

        // 3. Um único create/update, sem segurar o lock
        let result: Result<Value, AppError> = match survey_id {
            Some(id) => {
                backend::update_as(self.api.as_ref(), token, Resource::Surveys, &id.to_string(), &payload).await
            }
            None => backend::create_as(self.api.as_ref(), token, Resource::Surveys, &payload).await,
        };
        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                if let Some(wizard) = self.sessions.write().await.get_mut(&session_id) {
                    wizard.set_submitting(false);
                }
                return Err(e.with_banner(banner::SAVE_SURVEY));
            }
        };

        let saved_id = saved.get("id").and_then(Value::as_i64).or(survey_id);

        // 4. Sessão encerrada
        self.sessions.write().await.remove(&session_id);
        tracing::info!(
            "Vistoria {:?} salva para a solicitação {} por {}",
            saved_id,
            payload.enquiry,
            ctx.profile.email
        );

        Ok(SurveySummary {
            survey_id: saved_id,
            enquiry_id: payload.enquiry,
            customer_name: payload.full_name.clone(),
            goods_type: payload.goods_type,
            destination_count: payload.destination_addresses.len(),
            item_count: payload.articles.len() + payload.pets.len(),
            created: survey_id.is_none(),
            banner: Banner::success(banner::SURVEY_SAVED),
        })
    }

    pub async fn close(&self, ctx: &AuthContext, session_id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&session_id) {
            Some(w) if w.owner == ctx.profile.id => {
                w.ensure_editable()?;
                sessions.remove(&session_id);
                Ok(())
            }
            _ => Err(AppError::SessionNotFound),
        }
    }
}

/// Rascunho novo, com os dados de contato que a solicitação já tem.
fn draft_from_enquiry(enquiry: &Enquiry) -> SurveyDraft {
    let mut draft = SurveyDraft::new(enquiry.id);
    draft.customer.full_name = enquiry.full_name.clone();
    draft.customer.email = enquiry.email.clone().unwrap_or_default();
    draft.customer.mobile_number = enquiry.phone.clone().unwrap_or_default();
    draft.customer.survey_date = enquiry.move_date;
    draft
}
