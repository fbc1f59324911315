// src/services/booking_service.rs
//
// Leitura, edição composta e exclusão de reservas.
// A edição toca vários recursos da API; se um passo falhar, os anteriores
// são desfeitos na ordem inversa.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::{
    backend::{self, BackendApi, BearerToken, Resource},
    common::{
        banner::{self, Banner},
        error::AppError,
    },
    models::booking::{AssignmentBody, Booking, BookingUpdatePayload},
    services::auth_context::{Action, AuthContext},
};

const BOOKING_PAGE: &str = "booking";

#[derive(Debug, Clone, Serialize)]
pub struct BookingSaved {
    pub booking: Booking,
    pub banner: Banner,
}

/// Passo já aplicado na API, guardado para a compensação.
#[derive(Debug)]
enum AppliedStep {
    CoreUpdated,
    Created { resource: Resource, id: Option<i64> },
}

#[derive(Clone)]
pub struct BookingService {
    api: Arc<dyn BackendApi>,
}

impl BookingService {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    pub async fn get(&self, ctx: &AuthContext, token: &BearerToken, id: i64) -> Result<Booking, AppError> {
        ctx.require(BOOKING_PAGE, Action::View)?;
        backend::retrieve_as(self.api.as_ref(), token, Resource::Bookings, &id.to_string())
            .await
            .map_err(|e| match e {
                AppError::Upstream { status: 404, .. } => AppError::NotFound(format!("Booking {}", id)),
                other => other.with_banner(banner::FETCH_BOOKING),
            })
    }

    pub async fn save(
        &self,
        ctx: &AuthContext,
        token: &BearerToken,
        id: i64,
        update: BookingUpdatePayload,
    ) -> Result<BookingSaved, AppError> {
        // 1. Permissão e validação antes de qualquer request
        ctx.require(BOOKING_PAGE, Action::Edit)?;
        update.validate()?;

        let key = id.to_string();
        let api = self.api.as_ref();

        // 2. Foto da reserva antes da edição
        let snapshot = api
            .retrieve(token, Resource::Bookings, &key)
            .await
            .map_err(|e| e.with_banner(banner::FETCH_BOOKING))?;

        // 3. Passos, registrando o que já foi aplicado
        let mut applied = Vec::new();
        if let Err(e) = self.apply(token, id, &snapshot, &update, &mut applied).await {
            if applied.is_empty() {
                return Err(e.with_banner(banner::SAVE_BOOKING));
            }
            tracing::warn!("Falha ao salvar a reserva {} após {} passo(s): {}", id, applied.len(), e);
            let rolled_back = self.compensate(token, &key, &snapshot, applied).await;
            return Err(AppError::PartialSave {
                banner: banner::SAVE_BOOKING.to_string(),
                rolled_back,
            });
        }

        let booking = backend::retrieve_as(api, token, Resource::Bookings, &key)
            .await
            .map_err(|e| e.with_banner(banner::FETCH_BOOKING))?;
        tracing::info!("Reserva {} atualizada por {}", id, ctx.profile.email);

        Ok(BookingSaved { booking, banner: Banner::success(banner::BOOKING_SAVED) })
    }

    async fn apply(
        &self,
        token: &BearerToken,
        id: i64,
        snapshot: &Value,
        update: &BookingUpdatePayload,
        applied: &mut Vec<AppliedStep>,
    ) -> Result<(), AppError> {
        let api = self.api.as_ref();

        let mut merged = snapshot.clone();
        merge_fields(&mut merged, serde_json::to_value(&update.booking)?);
        if merged != *snapshot {
            api.update(token, Resource::Bookings, &id.to_string(), &merged).await?;
            applied.push(AppliedStep::CoreUpdated);
        }

        for labour in &update.labours {
            let body = serde_json::to_value(AssignmentBody { booking: id, fields: labour })?;
            let created = api.create(token, Resource::BookingLabours, &body).await?;
            applied.push(created_step(Resource::BookingLabours, &created));
        }
        for truck in &update.trucks {
            let body = serde_json::to_value(AssignmentBody { booking: id, fields: truck })?;
            let created = api.create(token, Resource::BookingTrucks, &body).await?;
            applied.push(created_step(Resource::BookingTrucks, &created));
        }
        for material in &update.materials {
            let body = serde_json::to_value(AssignmentBody { booking: id, fields: material })?;
            let created = api.create(token, Resource::BookingMaterials, &body).await?;
            applied.push(created_step(Resource::BookingMaterials, &created));
        }
        Ok(())
    }

    /// Desfaz na ordem inversa. Retorna `true` só se tudo foi desfeito.
    async fn compensate(
        &self,
        token: &BearerToken,
        key: &str,
        snapshot: &Value,
        applied: Vec<AppliedStep>,
    ) -> bool {
        let api = self.api.as_ref();
        let mut clean = true;

        for step in applied.into_iter().rev() {
            let outcome = match step {
                AppliedStep::Created { resource, id: Some(id) } => {
                    api.delete(token, resource, &id.to_string()).await
                }
                AppliedStep::Created { resource, id: None } => {
                    tracing::warn!("{} criado sem id; não há como desfazer", resource);
                    clean = false;
                    continue;
                }
                AppliedStep::CoreUpdated => {
                    api.update(token, Resource::Bookings, key, snapshot).await.map(|_| ())
                }
            };
            if let Err(e) = outcome {
                tracing::warn!("Compensação falhou na reserva {}: {}", key, e);
                clean = false;
            }
        }
        clean
    }

    pub async fn delete(&self, ctx: &AuthContext, token: &BearerToken, id: i64) -> Result<Banner, AppError> {
        ctx.require(BOOKING_PAGE, Action::Delete)?;
        self.api
            .delete(token, Resource::Bookings, &id.to_string())
            .await
            .map_err(|e| e.with_banner(banner::DELETE_BOOKING))?;
        tracing::info!("Reserva {} excluída por {}", id, ctx.profile.email);
        Ok(Banner::success(banner::BOOKING_DELETED))
    }
}

fn created_step(resource: Resource, created: &Value) -> AppliedStep {
    AppliedStep::Created { resource, id: created.get("id").and_then(Value::as_i64) }
}

/// Sobrescreve no alvo só as chaves presentes no patch.
fn merge_fields(target: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}
