// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

// Item do catálogo usado no sub-formulário de artigos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub room: Option<i64>,
    pub volume: Option<Decimal>,
    pub volume_unit: Option<String>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<String>,
}
