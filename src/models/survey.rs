// src/models/survey.rs

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-]{7,20}$").expect("valid phone pattern"));

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency pattern"));

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoodsType {
    Article,
    Pet,
}

impl GoodsType {
    pub fn label(&self) -> &'static str {
        match self {
            GoodsType::Article => "article",
            GoodsType::Pet => "pet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    ShortTerm,
    LongTerm,
}

/// Conjunto fixo de serviços perguntados na última aba.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Packing,
    Unpacking,
    Assembly,
    Disassembly,
    Insurance,
    Storage,
    Cleaning,
    PetRelocation,
    VehicleTransport,
    Handyman,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 10] = [
        ServiceKind::Packing,
        ServiceKind::Unpacking,
        ServiceKind::Assembly,
        ServiceKind::Disassembly,
        ServiceKind::Insurance,
        ServiceKind::Storage,
        ServiceKind::Cleaning,
        ServiceKind::PetRelocation,
        ServiceKind::VehicleTransport,
        ServiceKind::Handyman,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ServiceKind::Packing => "packing",
            ServiceKind::Unpacking => "unpacking",
            ServiceKind::Assembly => "assembly",
            ServiceKind::Disassembly => "disassembly",
            ServiceKind::Insurance => "insurance",
            ServiceKind::Storage => "storage",
            ServiceKind::Cleaning => "cleaning",
            ServiceKind::PetRelocation => "pet_relocation",
            ServiceKind::VehicleTransport => "vehicle_transport",
            ServiceKind::Handyman => "handyman",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            ServiceKind::Packing => "Do you require packing services?",
            ServiceKind::Unpacking => "Do you require unpacking services?",
            ServiceKind::Assembly => "Do you require furniture assembly?",
            ServiceKind::Disassembly => "Do you require furniture disassembly?",
            ServiceKind::Insurance => "Do you require transit insurance?",
            ServiceKind::Storage => "Do you require storage?",
            ServiceKind::Cleaning => "Do you require cleaning services?",
            ServiceKind::PetRelocation => "Do you require pet relocation?",
            ServiceKind::VehicleTransport => "Do you require vehicle transport?",
            ServiceKind::Handyman => "Do you require handyman services?",
        }
    }
}

// --- ABA 1: CLIENTE ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OriginAddress {
    #[validate(length(min = 1, message = "Origin address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Origin city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Origin country is required"))]
    pub country: String,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_survey_window"))]
pub struct CustomerSection {
    pub salutation: Option<String>,

    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(regex(path = *PHONE_RE, message = "Enter a valid phone number"))]
    pub mobile_number: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    pub company_name: Option<String>,

    #[serde(default)]
    pub is_military: bool,

    #[validate(length(min = 1, message = "Customer type is required"))]
    pub customer_type: String,

    #[validate(required(message = "Goods type is required"))]
    pub goods_type: Option<GoodsType>,

    #[validate(required(message = "Survey date is required"))]
    pub survey_date: Option<NaiveDate>,

    #[validate(required(message = "Survey start time is required"))]
    pub survey_start_time: Option<NaiveTime>,

    pub survey_end_time: Option<NaiveTime>,

    #[validate(nested)]
    pub origin: OriginAddress,

    #[serde(default)]
    pub same_as_customer_address: bool,

    #[serde(default)]
    pub multiple_addresses: bool,
}

fn validate_survey_window(section: &CustomerSection) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (section.survey_start_time, section.survey_end_time) {
        if end <= start {
            return Err(message_error(
                "invalid_time_window",
                "Survey end time must be after the start time",
            ));
        }
    }
    Ok(())
}

// --- Endereços de destino ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AddressFields {
    #[validate(length(min = 1, message = "Destination address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Destination city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Destination country is required"))]
    pub country: String,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub port_of_entry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationAddress {
    /// Id temporário, nunca enviado para a API.
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: AddressFields,
}

impl DestinationAddress {
    pub fn blank() -> Self {
        Self { id: Uuid::new_v4(), fields: AddressFields::default() }
    }
}

// --- ABA 2: ITENS ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub item_name: String,
    pub room: Option<i64>,
    pub quantity: u32,
    pub volume: Option<Decimal>,
    pub volume_unit: Option<String>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
    pub handyman_type: Option<String>,
    pub packing_option: Option<String>,
    pub move_status: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

/// Sub-formulário do item: escolhe do catálogo e confirma a quantidade.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArticleForm {
    pub item_id: i64,
    pub room_id: Option<i64>,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,

    #[validate(custom(function = "non_negative"))]
    pub volume: Option<Decimal>,
    pub volume_unit: Option<String>,

    #[validate(custom(function = "non_negative"))]
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,

    pub handyman_type: Option<String>,
    pub packing_option: Option<String>,
    pub move_status: Option<String>,

    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,

    #[validate(regex(path = *CURRENCY_RE, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,

    #[validate(length(max = 500, message = "Remarks are too long"))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PetFields {
    #[validate(length(min = 1, message = "Pet name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Pet type is required"))]
    pub species: String,
    pub breed: Option<String>,
    #[validate(range(min = 0, max = 40, message = "Age must be between 0 and 40"))]
    pub age: Option<u32>,
    #[validate(custom(function = "non_negative"))]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub vaccinated: bool,
    pub special_care: Option<String>,
    pub transport_requirements: Option<String>,
    pub feeding_instructions: Option<String>,
    pub medication: Option<String>,
    pub behavior_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: PetFields,
}

// --- ABA 3: SERVIÇOS ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceToggle {
    pub enabled: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_storage"))]
pub struct StorageDetails {
    #[serde(default)]
    pub storage_required: bool,
    pub storage_start_date: Option<NaiveDate>,
    pub storage_duration_days: Option<u32>,
    pub storage_type: Option<StorageType>,
    pub storage_notes: Option<String>,
}

fn validate_storage(storage: &StorageDetails) -> Result<(), ValidationError> {
    if !storage.storage_required {
        return Ok(());
    }
    match storage.storage_duration_days {
        Some(days) if (1..=3650).contains(&days) => Ok(()),
        _ => Err(message_error(
            "invalid_storage_duration",
            "Storage duration must be between 1 and 3650 days",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_service_section"))]
pub struct ServiceSection {
    pub packing_date_from: Option<NaiveDate>,
    pub packing_date_to: Option<NaiveDate>,
    pub loading_date: Option<NaiveDate>,
    pub eta: Option<NaiveDate>,
    pub etd: Option<NaiveDate>,
    pub estimated_delivery_date: Option<NaiveDate>,

    #[validate(nested)]
    #[serde(default)]
    pub storage: StorageDetails,

    #[serde(default = "default_services")]
    pub services: BTreeMap<ServiceKind, ServiceToggle>,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            packing_date_from: None,
            packing_date_to: None,
            loading_date: None,
            eta: None,
            etd: None,
            estimated_delivery_date: None,
            storage: StorageDetails::default(),
            services: default_services(),
        }
    }
}

/// Todos os serviços presentes, desligados.
pub fn default_services() -> BTreeMap<ServiceKind, ServiceToggle> {
    ServiceKind::ALL
        .iter()
        .map(|kind| (*kind, ServiceToggle::default()))
        .collect()
}

fn validate_service_section(section: &ServiceSection) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (section.packing_date_from, section.packing_date_to) {
        if from > to {
            return Err(message_error(
                "invalid_packing_window",
                "Packing start date must be on or before the end date",
            ));
        }
    }
    Ok(())
}

// --- RASCUNHO COMPLETO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyDraft {
    pub enquiry_id: i64,
    /// Preenchido quando o rascunho veio de uma vistoria já salva.
    pub survey_id: Option<i64>,
    pub customer: CustomerSection,
    pub destinations: Vec<DestinationAddress>,
    pub articles: Vec<Article>,
    pub pets: Vec<Pet>,
    pub service: ServiceSection,
}

impl SurveyDraft {
    pub fn new(enquiry_id: i64) -> Self {
        Self {
            enquiry_id,
            survey_id: None,
            customer: CustomerSection::default(),
            destinations: vec![DestinationAddress::blank()],
            articles: Vec::new(),
            pets: Vec::new(),
            service: ServiceSection::default(),
        }
    }

    /// Com `multipleAddresses` desligado só o primeiro destino conta.
    pub fn submitted_destinations(&self) -> &[DestinationAddress] {
        if self.customer.multiple_addresses {
            &self.destinations
        } else {
            &self.destinations[..self.destinations.len().min(1)]
        }
    }
}

// --- Validadores auxiliares ---

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(message_error("non_negative", "Value cannot be negative"));
    }
    Ok(())
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
