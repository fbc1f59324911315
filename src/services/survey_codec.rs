// src/services/survey_codec.rs
//
// Conversão rascunho <-> formato persistido em /surveys/.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::survey::{
    default_services, AddressFields, Article, ArticleFields, CustomerSection, DestinationAddress,
    GoodsType, OriginAddress, Pet, PetFields, ServiceKind, ServiceSection, ServiceToggle,
    StorageDetails, SurveyDraft,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub enquiry: i64,

    // Cliente
    pub salutation: Option<String>,
    pub full_name: String,
    pub mobile_number: String,
    pub email: String,
    pub company_name: Option<String>,
    #[serde(default)]
    pub is_military: bool,
    pub customer_type: String,
    pub goods_type: Option<GoodsType>,
    pub survey_date: Option<NaiveDate>,
    pub survey_start_time: Option<NaiveTime>,
    pub survey_end_time: Option<NaiveTime>,

    // Origem
    pub origin_address: String,
    pub origin_city: String,
    pub origin_country: String,
    pub origin_state: Option<String>,
    pub origin_zip: Option<String>,
    #[serde(default)]
    pub same_as_customer_address: bool,
    #[serde(default)]
    pub multiple_addresses: bool,

    #[serde(default)]
    pub destination_addresses: Vec<AddressFields>,
    #[serde(default)]
    pub articles: Vec<ArticleFields>,
    #[serde(default)]
    pub pets: Vec<PetFields>,

    // Logística
    pub packing_date_from: Option<NaiveDate>,
    pub packing_date_to: Option<NaiveDate>,
    pub loading_date: Option<NaiveDate>,
    pub eta: Option<NaiveDate>,
    pub etd: Option<NaiveDate>,
    pub estimated_delivery_date: Option<NaiveDate>,

    #[serde(flatten)]
    pub storage: StorageDetails,

    #[serde(default)]
    pub services: BTreeMap<ServiceKind, ServiceToggle>,
}

/// Serializa o rascunho inteiro. Só vai a coleção do tipo de carga ativo,
/// e notas de serviços desmarcados são descartadas.
pub fn to_payload(draft: &SurveyDraft) -> SurveyPayload {
    let customer = &draft.customer;
    let service = &draft.service;

    let articles = match customer.goods_type {
        Some(GoodsType::Article) => draft.articles.iter().map(|a| a.fields.clone()).collect(),
        _ => Vec::new(),
    };
    let pets = match customer.goods_type {
        Some(GoodsType::Pet) => draft.pets.iter().map(|p| p.fields.clone()).collect(),
        _ => Vec::new(),
    };

    let services = service
        .services
        .iter()
        .map(|(kind, toggle)| {
            let note = toggle
                .note
                .as_ref()
                .filter(|n| toggle.enabled && !n.trim().is_empty())
                .cloned();
            (*kind, ServiceToggle { enabled: toggle.enabled, note })
        })
        .collect();

    SurveyPayload {
        id: draft.survey_id,
        enquiry: draft.enquiry_id,
        salutation: customer.salutation.clone(),
        full_name: customer.full_name.clone(),
        mobile_number: customer.mobile_number.clone(),
        email: customer.email.clone(),
        company_name: customer.company_name.clone(),
        is_military: customer.is_military,
        customer_type: customer.customer_type.clone(),
        goods_type: customer.goods_type,
        survey_date: customer.survey_date,
        survey_start_time: customer.survey_start_time,
        survey_end_time: customer.survey_end_time,
        origin_address: customer.origin.address.clone(),
        origin_city: customer.origin.city.clone(),
        origin_country: customer.origin.country.clone(),
        origin_state: customer.origin.state.clone(),
        origin_zip: customer.origin.zip.clone(),
        same_as_customer_address: customer.same_as_customer_address,
        multiple_addresses: customer.multiple_addresses,
        destination_addresses: draft
            .submitted_destinations()
            .iter()
            .map(|d| d.fields.clone())
            .collect(),
        articles,
        pets,
        packing_date_from: service.packing_date_from,
        packing_date_to: service.packing_date_to,
        loading_date: service.loading_date,
        eta: service.eta,
        etd: service.etd,
        estimated_delivery_date: service.estimated_delivery_date,
        storage: service.storage.clone(),
        services,
    }
}

/// Hidrata um rascunho a partir da vistoria salva. Ids temporários são novos.
pub fn from_payload(payload: SurveyPayload) -> SurveyDraft {
    let mut destinations: Vec<DestinationAddress> = payload
        .destination_addresses
        .into_iter()
        .map(|fields| DestinationAddress { id: Uuid::new_v4(), fields })
        .collect();
    if destinations.is_empty() {
        destinations.push(DestinationAddress::blank());
    }

    // Serviços ausentes na resposta continuam presentes, desligados.
    let mut services = default_services();
    services.extend(payload.services);

    SurveyDraft {
        enquiry_id: payload.enquiry,
        survey_id: payload.id,
        customer: CustomerSection {
            salutation: payload.salutation,
            full_name: payload.full_name,
            mobile_number: payload.mobile_number,
            email: payload.email,
            company_name: payload.company_name,
            is_military: payload.is_military,
            customer_type: payload.customer_type,
            goods_type: payload.goods_type,
            survey_date: payload.survey_date,
            survey_start_time: payload.survey_start_time,
            survey_end_time: payload.survey_end_time,
            origin: OriginAddress {
                address: payload.origin_address,
                city: payload.origin_city,
                country: payload.origin_country,
                state: payload.origin_state,
                zip: payload.origin_zip,
            },
            same_as_customer_address: payload.same_as_customer_address,
            multiple_addresses: payload.multiple_addresses,
        },
        destinations,
        articles: payload
            .articles
            .into_iter()
            .map(|fields| Article { id: Uuid::new_v4(), fields })
            .collect(),
        pets: payload
            .pets
            .into_iter()
            .map(|fields| Pet { id: Uuid::new_v4(), fields })
            .collect(),
        service: ServiceSection {
            packing_date_from: payload.packing_date_from,
            packing_date_to: payload.packing_date_to,
            loading_date: payload.loading_date,
            eta: payload.eta,
            etd: payload.etd,
            estimated_delivery_date: payload.estimated_delivery_date,
            storage: payload.storage,
            services,
        },
    }
}
