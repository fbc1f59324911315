// src/services/wizard.rs
//
// Máquina de estados do formulário de vistoria: customer -> items -> service.
// Tudo aqui é local; nada vai para a API antes do envio final.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{flatten_validation_errors, FieldErrors},
    models::{
        catalog::{CatalogItem, Room},
        survey::{
            default_services, AddressFields, Article, ArticleFields, ArticleForm, CustomerSection,
            DestinationAddress, GoodsType, Pet, PetFields, ServiceKind, ServiceSection, SurveyDraft,
        },
    },
    services::{
        forms,
        survey_codec::{self, SurveyPayload},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardTab {
    Customer,
    Items,
    Service,
}

impl WizardTab {
    pub fn next(self) -> Option<Self> {
        match self {
            WizardTab::Customer => Some(WizardTab::Items),
            WizardTab::Items => Some(WizardTab::Service),
            WizardTab::Service => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            WizardTab::Customer => None,
            WizardTab::Items => Some(WizardTab::Customer),
            WizardTab::Service => Some(WizardTab::Items),
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Please fix the highlighted fields before continuing")]
    Blocked { tab: WizardTab, errors: FieldErrors },

    #[error("One or more fields are invalid")]
    InvalidEntry { errors: FieldErrors },

    #[error("At least one destination address is required")]
    LastDestination,

    #[error("{kind} {id} not found in this survey")]
    EntryNotFound { kind: &'static str, id: Uuid },

    #[error("Item {0} is not in the catalog")]
    UnknownCatalogItem(i64),

    #[error("The survey can only be submitted from the service tab")]
    NotOnServiceTab,

    #[error("This survey is being saved. Please wait for it to finish.")]
    SubmitInProgress,
}

/// Resultado do botão "voltar".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "tab", rename_all = "lowercase")]
pub enum BackOutcome {
    Moved(WizardTab),
    Exit,
}

/// Substituição das seções editáveis do rascunho.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftUpdate {
    pub customer: Option<CustomerSection>,
    pub service: Option<ServiceSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyWizard {
    pub session_id: Uuid,
    #[serde(skip)]
    pub owner: i64,
    pub tab: WizardTab,
    pub draft: SurveyDraft,
    pub rooms: Vec<Room>,
    pub catalog: Vec<CatalogItem>,
    /// Endereço informado na solicitação, usado por `same_as_customer_address`.
    pub enquiry_address: Option<String>,
    #[serde(skip)]
    touched_at: Option<Instant>,
    /// Há um create/update em andamento para esta sessão.
    #[serde(skip)]
    submitting: bool,
}

impl SurveyWizard {
    pub fn new(owner: i64, draft: SurveyDraft, rooms: Vec<Room>, catalog: Vec<CatalogItem>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            owner,
            tab: WizardTab::Customer,
            draft,
            rooms,
            catalog,
            enquiry_address: None,
            touched_at: Some(Instant::now()),
            submitting: false,
        }
    }

    /// Guarda o endereço da solicitação e, se o rascunho hidratado já marca
    /// `same_as_customer_address` com a rua em branco, copia para a origem.
    pub fn with_enquiry_address(mut self, address: Option<String>) -> Self {
        let origin = &mut self.draft.customer.origin;
        if self.draft.customer.same_as_customer_address && origin.address.trim().is_empty() {
            if let Some(street) = address.as_deref().filter(|a| !a.trim().is_empty()) {
                origin.address = street.to_string();
            }
        }
        self.enquiry_address = address;
        self
    }

    pub fn touch(&mut self) {
        self.touched_at = Some(Instant::now());
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.touched_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Falha enquanto o envio estiver em andamento.
    pub fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmitInProgress);
        }
        Ok(())
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn goods_type(&self) -> Option<GoodsType> {
        self.draft.customer.goods_type
    }

    // =========================================================================
    //  NAVEGAÇÃO
    // =========================================================================

    /// "Próximo": valida a aba visível e avança. Na última aba só valida.
    pub fn advance(&mut self) -> Result<WizardTab, WizardError> {
        self.check_tab(self.tab)?;
        if let Some(next) = self.tab.next() {
            self.tab = next;
        }
        Ok(self.tab)
    }

    /// Volta uma aba; da primeira, sai do formulário. Nunca descarta dados.
    pub fn back(&mut self) -> BackOutcome {
        match self.tab.previous() {
            Some(previous) => {
                self.tab = previous;
                BackOutcome::Moved(previous)
            }
            None => BackOutcome::Exit,
        }
    }

    /// Valida todas as abas, em ordem, e monta o corpo do envio.
    pub fn prepare_submission(&self) -> Result<SurveyPayload, WizardError> {
        if self.tab != WizardTab::Service {
            return Err(WizardError::NotOnServiceTab);
        }
        for tab in [WizardTab::Customer, WizardTab::Items, WizardTab::Service] {
            self.check_tab(tab)?;
        }
        Ok(survey_codec::to_payload(&self.draft))
    }

    pub fn check_tab(&self, tab: WizardTab) -> Result<(), WizardError> {
        let errors = match tab {
            WizardTab::Customer => self.customer_errors(),
            WizardTab::Items => self.items_errors(),
            WizardTab::Service => self.service_errors(),
        };
        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!("Aba {:?} bloqueada: {:?}", tab, errors.keys().collect::<Vec<_>>());
            Err(WizardError::Blocked { tab, errors })
        }
    }

    fn customer_errors(&self) -> FieldErrors {
        let customer = &self.draft.customer;
        // Com `same_as_customer_address` a rua vem da solicitação; cidade e país continuam obrigatórios.
        let mut errors = match customer.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => flatten_validation_errors(&e),
        };

        for (index, destination) in self.draft.submitted_destinations().iter().enumerate() {
            if let Err(e) = destination.fields.validate() {
                for (field, messages) in flatten_validation_errors(&e) {
                    errors
                        .entry(format!("destinations[{}].{}", index, field))
                        .or_default()
                        .extend(messages);
                }
            }
        }
        errors
    }

    fn items_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let empty = match self.goods_type() {
            Some(GoodsType::Article) => self.draft.articles.is_empty(),
            Some(GoodsType::Pet) => self.draft.pets.is_empty(),
            None => {
                errors.insert("goods_type".into(), vec!["Goods type is required".into()]);
                return errors;
            }
        };
        if empty {
            let label = self.goods_type().map(|g| g.label()).unwrap_or("item");
            errors.insert(
                "items".into(),
                vec![format!("Please add at least one {} before proceeding.", label)],
            );
        }
        errors
    }

    fn service_errors(&self) -> FieldErrors {
        let service = &self.draft.service;
        let mut errors = match service.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => flatten_validation_errors(&e),
        };

        let values = service_form_values(service);
        if let Err(field_codes) = forms::check_values(&forms::service_tab_fields(), &values) {
            for (field, code) in field_codes {
                errors.entry(field).or_default().push(code_message(&code).to_string());
            }
        }
        errors
    }

    // =========================================================================
    //  EDIÇÃO
    // =========================================================================

    pub fn apply_update(&mut self, update: DraftUpdate) {
        if let Some(mut customer) = update.customer {
            if customer.same_as_customer_address {
                if let Some(address) = &self.enquiry_address {
                    customer.origin.address = address.clone();
                }
            }
            self.draft.customer = customer;
        }
        if let Some(mut service) = update.service {
            // O conjunto de serviços é fixo; o que faltar volta desligado.
            let mut services = default_services();
            services.extend(service.services);
            service.services = services;
            self.draft.service = service;
        }
    }

    pub fn add_destination(&mut self) -> Uuid {
        let destination = DestinationAddress::blank();
        let id = destination.id;
        self.draft.destinations.push(destination);
        id
    }

    pub fn update_destination(&mut self, id: Uuid, fields: AddressFields) -> Result<(), WizardError> {
        let destination = self
            .draft
            .destinations
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(WizardError::EntryNotFound { kind: "Destination", id })?;
        destination.fields = fields;
        Ok(())
    }

    /// O último destino nunca sai.
    pub fn remove_destination(&mut self, id: Uuid) -> Result<(), WizardError> {
        let index = self
            .draft
            .destinations
            .iter()
            .position(|d| d.id == id)
            .ok_or(WizardError::EntryNotFound { kind: "Destination", id })?;
        if self.draft.destinations.len() <= 1 {
            return Err(WizardError::LastDestination);
        }
        self.draft.destinations.remove(index);
        Ok(())
    }

    /// Item escolhido no catálogo; o que o operador não informar vem do catálogo.
    pub fn add_article(&mut self, form: ArticleForm) -> Result<Uuid, WizardError> {
        form.validate()
            .map_err(|e| WizardError::InvalidEntry { errors: flatten_validation_errors(&e) })?;

        let item = self
            .catalog
            .iter()
            .find(|i| i.id == form.item_id)
            .ok_or(WizardError::UnknownCatalogItem(form.item_id))?;

        let article = Article {
            id: Uuid::new_v4(),
            fields: ArticleFields {
                item_name: item.name.clone(),
                room: form.room_id.or(item.room),
                quantity: form.quantity,
                volume: form.volume.or(item.volume),
                volume_unit: form.volume_unit.or_else(|| item.volume_unit.clone()),
                weight: form.weight.or(item.weight),
                weight_unit: form.weight_unit.or_else(|| item.weight_unit.clone()),
                handyman_type: form.handyman_type,
                packing_option: form.packing_option,
                move_status: form.move_status,
                amount: form.amount,
                currency: form.currency,
                remarks: form.remarks,
            },
        };
        let id = article.id;
        self.draft.articles.push(article);
        Ok(id)
    }

    pub fn remove_article(&mut self, id: Uuid) -> Result<(), WizardError> {
        let before = self.draft.articles.len();
        self.draft.articles.retain(|a| a.id != id);
        if self.draft.articles.len() == before {
            return Err(WizardError::EntryNotFound { kind: "Article", id });
        }
        Ok(())
    }

    pub fn add_pet(&mut self, fields: PetFields) -> Result<Uuid, WizardError> {
        fields
            .validate()
            .map_err(|e| WizardError::InvalidEntry { errors: flatten_validation_errors(&e) })?;
        let pet = Pet { id: Uuid::new_v4(), fields };
        let id = pet.id;
        self.draft.pets.push(pet);
        Ok(id)
    }

    pub fn remove_pet(&mut self, id: Uuid) -> Result<(), WizardError> {
        let before = self.draft.pets.len();
        self.draft.pets.retain(|p| p.id != id);
        if self.draft.pets.len() == before {
            return Err(WizardError::EntryNotFound { kind: "Pet", id });
        }
        Ok(())
    }
}

/// Aba de serviços no formato plano do formulário (um valor por campo).
fn service_form_values(service: &ServiceSection) -> Value {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| Value::String(d.format("%Y-%m-%d").to_string())).unwrap_or(Value::Null)
    };
    let storage = &service.storage;

    let mut values = Map::new();
    values.insert("packing_date_from".into(), date(service.packing_date_from));
    values.insert("packing_date_to".into(), date(service.packing_date_to));
    values.insert("loading_date".into(), date(service.loading_date));
    values.insert("etd".into(), date(service.etd));
    values.insert("eta".into(), date(service.eta));
    values.insert("estimated_delivery_date".into(), date(service.estimated_delivery_date));
    values.insert("storage_required".into(), json!(storage.storage_required));
    values.insert("storage_type".into(), json!(storage.storage_type));
    values.insert("storage_start_date".into(), date(storage.storage_start_date));
    values.insert(
        "storage_duration_days".into(),
        json!(storage.storage_duration_days.map(|d| d.to_string())),
    );
    values.insert("storage_notes".into(), json!(storage.storage_notes));

    for kind in ServiceKind::ALL {
        let toggle = service.services.get(&kind).cloned().unwrap_or_default();
        values.insert(kind.key().into(), json!(toggle.enabled));
        values.insert(format!("{}_note", kind.key()), json!(toggle.note));
    }
    Value::Object(values)
}

fn code_message(code: &str) -> &'static str {
    match code {
        "required" => "This field is required",
        "too_long" => "This text is too long",
        "invalid_date_format" => "Enter a valid date",
        "pattern_mismatch" => "Enter a whole number",
        "invalid_option" => "Choose one of the available options",
        _ => "Invalid value",
    }
}
