// src/models/booking.rs

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourAssignment {
    pub id: i64,
    pub staff: i64,
    pub staff_name: Option<String>,
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckAssignment {
    pub id: i64,
    pub truck: i64,
    pub truck_name: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAssignment {
    pub id: i64,
    pub material: i64,
    pub material_name: Option<String>,
    pub quantity: Decimal,
}

// O que sai de /bookings/{id}/. Quase tudo é opcional na API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Número de exibição (ex.: "BK-0042").
    pub booking_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub move_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub status: Option<String>,
    pub estimated_volume: Option<Decimal>,
    pub supervisor_name: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub labours: Vec<LabourAssignment>,
    #[serde(default)]
    pub trucks: Vec<TruckAssignment>,
    #[serde(default)]
    pub materials: Vec<MaterialAssignment>,
}

// --- Edição composta (reserva + alocações) ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewLabour {
    pub staff: i64,
    #[validate(custom(function = "positive"))]
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTruck {
    pub truck: i64,
    #[validate(range(min = 1, message = "Truck quantity must be at least 1"))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewMaterial {
    pub material: i64,
    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,
}

/// Campos da própria reserva que o console pode alterar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct BookingCoreUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_name: Option<String>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdatePayload {
    #[validate(nested)]
    #[serde(default)]
    pub booking: BookingCoreUpdate,
    #[validate(nested)]
    #[serde(default)]
    pub labours: Vec<NewLabour>,
    #[validate(nested)]
    #[serde(default)]
    pub trucks: Vec<NewTruck>,
    #[validate(nested)]
    #[serde(default)]
    pub materials: Vec<NewMaterial>,
}

/// Corpo de criação de uma alocação: `{"booking": 12, ...campos}`.
#[derive(Debug, Serialize)]
pub struct AssignmentBody<'a, T: Serialize> {
    pub booking: i64,
    #[serde(flatten)]
    pub fields: &'a T,
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("Value must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}
