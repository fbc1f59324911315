pub mod auth;
pub mod booking;
pub mod catalog;
pub mod enquiry;
pub mod rbac;
pub mod survey;
