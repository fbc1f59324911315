// src/common/banner.rs

use serde::Serialize;

// Textos fixos exibidos no topo da página, um por ação.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const FETCH_SURVEY: &str = "Failed to fetch survey details.";
pub const FETCH_LOOKUPS: &str = "Failed to fetch form options.";
pub const SAVE_SURVEY: &str = "Failed to save survey.";
pub const FETCH_ENQUIRIES: &str = "Failed to fetch enquiries.";
pub const SAVE_ENQUIRY: &str = "Failed to submit enquiry.";
pub const FETCH_BOOKING: &str = "Failed to fetch booking details.";
pub const SAVE_BOOKING: &str = "Failed to save booking.";
pub const DELETE_BOOKING: &str = "Failed to delete booking.";
pub const FETCH_QUOTATION: &str = "Failed to fetch quotation.";
pub const FETCH_PROFILE: &str = "Failed to fetch user profile.";
pub const GENERATE_PDF: &str = "Failed to generate PDF.";

pub const SURVEY_SAVED: &str = "Survey saved successfully.";
pub const ENQUIRY_SAVED: &str = "Enquiry submitted successfully.";
pub const BOOKING_SAVED: &str = "Booking updated successfully.";
pub const BOOKING_DELETED: &str = "Booking deleted successfully.";

/// Sucesso some sozinho; erro fica até o usuário fechar.
const SUCCESS_DISMISS_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub auto_dismiss_ms: Option<u64>,
}

impl Banner {
    pub fn success(message: &str) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.to_string(),
            auto_dismiss_ms: Some(SUCCESS_DISMISS_MS),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.to_string(),
            auto_dismiss_ms: None,
        }
    }
}
