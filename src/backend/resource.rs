// src/backend/resource.rs

use std::fmt;
use std::str::FromStr;

/// Recursos da API REST principal que o console consome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Materials,
    Rooms,
    Items,
    Trucks,
    TruckTypes,
    Teams,
    Hubs,
    Users,
    Roles,
    Profile,
    Enquiries,
    Surveys,
    SurveyRemarks,
    Bookings,
    BookingLabours,
    BookingTrucks,
    BookingMaterials,
    QuotationCreate,
    InsurancePlans,
    PaymentTerms,
    QuoteNotes,
}

impl Resource {
    /// Listas de apoio que podem ser pedidas em `/api/lookups`.
    pub const LOOKUPS: [Resource; 12] = [
        Resource::Materials,
        Resource::Rooms,
        Resource::Items,
        Resource::Trucks,
        Resource::TruckTypes,
        Resource::Teams,
        Resource::Hubs,
        Resource::InsurancePlans,
        Resource::PaymentTerms,
        Resource::QuoteNotes,
        Resource::SurveyRemarks,
        Resource::Users,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Resource::Materials => "/materials/",
            Resource::Rooms => "/rooms/",
            Resource::Items => "/items/",
            Resource::Trucks => "/trucks/",
            Resource::TruckTypes => "/truck-types/",
            Resource::Teams => "/teams/",
            Resource::Hubs => "/hubs/",
            Resource::Users => "/auth/users/",
            Resource::Roles => "/auth/roles/",
            Resource::Profile => "/auth/profile/",
            Resource::Enquiries => "/contacts/enquiries/",
            Resource::Surveys => "/surveys/",
            Resource::SurveyRemarks => "/survey-remarks/",
            Resource::Bookings => "/bookings/",
            Resource::BookingLabours => "/booking-labours/",
            Resource::BookingTrucks => "/booking-trucks/",
            Resource::BookingMaterials => "/booking-materials/",
            Resource::QuotationCreate => "/quotation-create/",
            Resource::InsurancePlans => "/insurance-plans/",
            Resource::PaymentTerms => "/payment-terms/",
            Resource::QuoteNotes => "/quote-notes/",
        }
    }

    /// Caminho de um registro: `/bookings/12/`.
    pub fn item_path(&self, id: &str) -> String {
        format!("{}{}/", self.path(), id)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Resource::Materials => "materials",
            Resource::Rooms => "rooms",
            Resource::Items => "items",
            Resource::Trucks => "trucks",
            Resource::TruckTypes => "truck-types",
            Resource::Teams => "teams",
            Resource::Hubs => "hubs",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::Profile => "profile",
            Resource::Enquiries => "enquiries",
            Resource::Surveys => "surveys",
            Resource::SurveyRemarks => "survey-remarks",
            Resource::Bookings => "bookings",
            Resource::BookingLabours => "booking-labours",
            Resource::BookingTrucks => "booking-trucks",
            Resource::BookingMaterials => "booking-materials",
            Resource::QuotationCreate => "quotation-create",
            Resource::InsurancePlans => "insurance-plans",
            Resource::PaymentTerms => "payment-terms",
            Resource::QuoteNotes => "quote-notes",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lookup resource '{0}'")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    /// Só aceita as listas de apoio; recursos sensíveis não são expostos por slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::LOOKUPS
            .iter()
            .copied()
            .find(|r| r.slug() == s.trim())
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
