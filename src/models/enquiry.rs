// src/models/enquiry.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// O que vem de /contacts/enquiries/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub status: Option<String>,
    pub move_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub message: Option<String>,
    /// Vistoriador responsável; `None` = ainda não atribuída.
    pub assigned_user: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

// Formulário de nova solicitação (o token do CAPTCHA é obrigatório)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryPayload {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 7, max = 20, message = "Enter a valid phone number"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,

    pub move_date: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Message is too long"))]
    pub message: Option<String>,

    #[serde(default)]
    pub captcha_token: String,
}

// Corpo enviado para a API, com o token anexado
#[derive(Debug, Serialize)]
pub struct NewEnquiry<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub service_type: &'a str,
    pub move_date: Option<NaiveDate>,
    pub message: Option<&'a str>,
    pub recaptcha_token: &'a str,
}

impl<'a> From<&'a CreateEnquiryPayload> for NewEnquiry<'a> {
    fn from(payload: &'a CreateEnquiryPayload) -> Self {
        Self {
            full_name: &payload.full_name,
            email: &payload.email,
            phone: &payload.phone,
            service_type: &payload.service_type,
            move_date: payload.move_date,
            message: payload.message.as_deref(),
            recaptcha_token: &payload.captcha_token,
        }
    }
}
