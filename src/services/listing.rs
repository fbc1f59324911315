// src/services/listing.rs
//
// Filtro e paginação da lista de solicitações. Tudo em memória, sobre o
// que /contacts/enquiries/ devolveu.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::enquiry::Enquiry;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
pub const MAX_PAGE: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    Assigned,
    Unassigned,
}

/// Critérios vindos da query string. Campos vazios não filtram.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub service_type: Option<String>,
    pub move_date_from: Option<NaiveDate>,
    pub move_date_to: Option<NaiveDate>,
    pub assigned: Option<Assignment>,
}

impl EnquiryFilter {
    pub fn matches(&self, enquiry: &Enquiry) -> bool {
        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            let hit = [Some(enquiry.full_name.as_str()), enquiry.email.as_deref(), enquiry.phone.as_deref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(status) = non_blank(&self.status) {
            if !enquiry.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(status)) {
                return false;
            }
        }

        if let Some(service_type) = non_blank(&self.service_type) {
            if !enquiry
                .service_type
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(service_type))
            {
                return false;
            }
        }

        // Intervalo inclusivo; sem data de mudança = fora de qualquer intervalo
        if self.move_date_from.is_some() || self.move_date_to.is_some() {
            let Some(date) = enquiry.move_date else { return false };
            if self.move_date_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.move_date_to.is_some_and(|to| date > to) {
                return false;
            }
        }

        match self.assigned {
            Some(Assignment::Assigned) => enquiry.assigned_user.is_some(),
            Some(Assignment::Unassigned) => enquiry.assigned_user.is_none(),
            None => true,
        }
    }

    /// Mantém a ordem original. Aplicar duas vezes dá o mesmo resultado.
    pub fn apply(&self, enquiries: Vec<Enquiry>) -> Vec<Enquiry> {
        enquiries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    #[validate(range(min = 1, max = 100_000, message = "Page must be between 1 and 100000"))]
    pub page: usize,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

fn first_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Página fora do intervalo devolve `items` vazio, mas com os totais corretos.
    pub fn paginate<T>(&self, rows: Vec<T>) -> Page<T> {
        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let page = self.page.clamp(1, MAX_PAGE);
        let total = rows.len();
        let total_pages = total.div_ceil(page_size);

        let items = rows
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Page { items, total, page, page_size, total_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enquiry(id: i64, name: &str, status: &str, day: Option<u32>, assigned: Option<i64>) -> Enquiry {
        Enquiry {
            id,
            full_name: name.into(),
            email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
            phone: Some(format!("+97150000{:04}", id)),
            service_type: Some(if id % 2 == 0 { "local" } else { "international" }.into()),
            status: Some(status.into()),
            move_date: day.and_then(|d| NaiveDate::from_ymd_opt(2026, 11, d)),
            address: None,
            message: None,
            assigned_user: assigned,
            created_at: None,
        }
    }

    fn sample() -> Vec<Enquiry> {
        vec![
            enquiry(1, "Amina Yusuf", "new", Some(2), None),
            enquiry(2, "Omar Haddad", "new", Some(10), Some(7)),
            enquiry(3, "Lena Fischer", "contacted", None, Some(7)),
            enquiry(4, "Yusuf Ali", "new", Some(20), None),
            enquiry(5, "Maria Costa", "closed", Some(5), None),
        ]
    }

    #[test]
    fn search_is_case_insensitive_across_contact_fields() {
        let filter = EnquiryFilter { search: Some("YUSUF".into()), ..Default::default() };
        let ids: Vec<i64> = filter.apply(sample()).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);

        let by_phone = EnquiryFilter { search: Some("0003".into()), ..Default::default() };
        assert_eq!(by_phone.apply(sample())[0].id, 3);
    }

    #[test]
    fn criteria_combine() {
        let filter = EnquiryFilter {
            status: Some("new".into()),
            move_date_from: NaiveDate::from_ymd_opt(2026, 11, 2),
            move_date_to: NaiveDate::from_ymd_opt(2026, 11, 10),
            assigned: Some(Assignment::Unassigned),
            ..Default::default()
        };
        let ids: Vec<i64> = filter.apply(sample()).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn date_range_excludes_undated_enquiries() {
        let filter = EnquiryFilter {
            move_date_to: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..Default::default()
        };
        assert!(filter.apply(sample()).iter().all(|e| e.id != 3));
    }

    #[test]
    fn filtering_twice_equals_filtering_once() {
        let filters = [
            EnquiryFilter::default(),
            EnquiryFilter { search: Some("a".into()), ..Default::default() },
            EnquiryFilter { service_type: Some("local".into()), assigned: Some(Assignment::Assigned), ..Default::default() },
            EnquiryFilter { move_date_from: NaiveDate::from_ymd_opt(2026, 11, 5), ..Default::default() },
        ];
        for filter in filters {
            let once = filter.apply(sample());
            let twice = filter.apply(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn paginates_with_totals() {
        let page = Pagination { page: 2, page_size: 2 }.paginate(sample());
        assert_eq!(page.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let past_end = Pagination { page: 9, page_size: 2 }.paginate(sample());
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 3);
    }

    #[test]
    fn empty_list_has_zero_pages() {
        let page = Pagination::default().paginate(Vec::<Enquiry>::new());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn huge_page_number_is_rejected_and_never_overflows() {
        let huge = Pagination { page: usize::MAX, page_size: MAX_PAGE_SIZE };
        let errors = huge.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("page"));

        let page = huge.paginate(sample());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.page, MAX_PAGE);
    }
}
