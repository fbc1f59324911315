pub mod auth_context;
pub mod booking_service;
pub mod document_service;
pub mod forms;
pub mod listing;
pub mod survey_codec;
pub mod survey_service;
pub mod wizard;
