pub mod banner;
pub mod error;
