// src/services/forms.rs
//
// Tipos de campo fechados (texto, seleção, área de texto, checkbox, data).
// O console usa isso para descrever formulários e validar valores soltos.

use std::collections::HashMap;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::models::survey::ServiceKind;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_len: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Textarea {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_len: Option<usize>,
    },
    Checkbox,
    Date,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Campo só aparece quando o checkbox indicado está marcado.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            kind,
            visible_when: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn visible_when(mut self, checkbox: &str) -> Self {
        self.visible_when = Some(checkbox.to_string());
        self
    }

    /// Valida um valor contra o tipo do campo. Retorna o código do erro.
    pub fn check(&self, value: Option<&Value>) -> Result<(), &'static str> {
        let missing = match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            _ => false,
        };
        if missing {
            // Checkbox ausente = desmarcado
            return if self.required && !matches!(self.kind, FieldKind::Checkbox) {
                Err("required")
            } else {
                Ok(())
            };
        }
        let Some(value) = value else { return Ok(()) };

        match &self.kind {
            FieldKind::Text { max_len, pattern } => {
                let text = value.as_str().ok_or("invalid_text")?;
                if max_len.is_some_and(|max| text.chars().count() > max) {
                    return Err("too_long");
                }
                if let Some(pattern) = pattern {
                    let re = Regex::new(pattern).map_err(|_| "invalid_pattern")?;
                    if !re.is_match(text) {
                        return Err("pattern_mismatch");
                    }
                }
                Ok(())
            }
            FieldKind::Textarea { max_len } => {
                let text = value.as_str().ok_or("invalid_text")?;
                if max_len.is_some_and(|max| text.chars().count() > max) {
                    return Err("too_long");
                }
                Ok(())
            }
            FieldKind::Select { options } => {
                let chosen = value.as_str().ok_or("invalid_option")?;
                if options.iter().any(|o| o.value == chosen) {
                    Ok(())
                } else {
                    Err("invalid_option")
                }
            }
            FieldKind::Checkbox => value.as_bool().map(|_| ()).ok_or("invalid_boolean"),
            FieldKind::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(|_| ())
                .ok_or("invalid_date_format"),
        }
    }
}

/// Valida um objeto inteiro. Campos ocultos (checkbox desmarcado) são ignorados.
pub fn check_values(specs: &[FieldSpec], data: &Value) -> Result<(), HashMap<String, String>> {
    let empty = serde_json::Map::new();
    let obj = data.as_object().unwrap_or(&empty);
    let mut errors = HashMap::new();

    for spec in specs {
        if let Some(toggle) = &spec.visible_when {
            let shown = obj.get(toggle).and_then(Value::as_bool).unwrap_or(false);
            if !shown {
                continue;
            }
        }
        if let Err(code) = spec.check(obj.get(&spec.name)) {
            errors.insert(spec.name.clone(), code.to_string());
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Layout da aba de serviços: um checkbox por serviço + nota que aparece ao marcar.
pub fn service_tab_fields() -> Vec<FieldSpec> {
    let mut fields = vec![
        FieldSpec::new("packing_date_from", "Packing from", FieldKind::Date),
        FieldSpec::new("packing_date_to", "Packing to", FieldKind::Date),
        FieldSpec::new("loading_date", "Loading date", FieldKind::Date),
        FieldSpec::new("etd", "ETD", FieldKind::Date),
        FieldSpec::new("eta", "ETA", FieldKind::Date),
        FieldSpec::new("estimated_delivery_date", "Estimated delivery", FieldKind::Date),
        FieldSpec::new("storage_required", "Storage required", FieldKind::Checkbox),
        FieldSpec::new(
            "storage_type",
            "Storage type",
            FieldKind::Select {
                options: vec![
                    SelectOption { value: "short_term".into(), label: "Short term".into() },
                    SelectOption { value: "long_term".into(), label: "Long term".into() },
                ],
            },
        )
        .visible_when("storage_required"),
        FieldSpec::new("storage_start_date", "Storage start", FieldKind::Date)
            .visible_when("storage_required"),
        FieldSpec::new(
            "storage_duration_days",
            "Storage duration (days)",
            FieldKind::Text { max_len: Some(4), pattern: Some(r"^[0-9]+$".into()) },
        )
        .required()
        .visible_when("storage_required"),
        FieldSpec::new("storage_notes", "Storage notes", FieldKind::Textarea { max_len: Some(1000) })
            .visible_when("storage_required"),
    ];

    for kind in ServiceKind::ALL {
        let note = format!("{}_note", kind.key());
        fields.push(FieldSpec::new(kind.key(), kind.question(), FieldKind::Checkbox));
        fields.push(
            FieldSpec::new(&note, "Notes", FieldKind::Textarea { max_len: Some(1000) })
                .visible_when(kind.key()),
        );
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_on_field_kind() {
        let date = FieldSpec::new("d", "D", FieldKind::Date);
        assert_eq!(date.check(Some(&json!("2026-10-01"))), Ok(()));
        assert_eq!(date.check(Some(&json!("01/10/2026"))), Err("invalid_date_format"));

        let checkbox = FieldSpec::new("c", "C", FieldKind::Checkbox).required();
        assert_eq!(checkbox.check(None), Ok(()));
        assert_eq!(checkbox.check(Some(&json!("yes"))), Err("invalid_boolean"));

        let select = FieldSpec::new(
            "s",
            "S",
            FieldKind::Select { options: vec![SelectOption { value: "a".into(), label: "A".into() }] },
        );
        assert_eq!(select.check(Some(&json!("b"))), Err("invalid_option"));

        let text = FieldSpec::new("t", "T", FieldKind::Text { max_len: Some(3), pattern: None }).required();
        assert_eq!(text.check(Some(&json!(""))), Err("required"));
        assert_eq!(text.check(Some(&json!("abcd"))), Err("too_long"));
    }

    #[test]
    fn hidden_notes_are_not_validated() {
        let specs = service_tab_fields();
        let long_note = "x".repeat(1001);

        let hidden = json!({ "packing": false, "packing_note": long_note });
        assert!(check_values(&specs, &hidden).is_ok());

        let shown = json!({ "packing": true, "packing_note": long_note });
        let errors = check_values(&specs, &shown).unwrap_err();
        assert_eq!(errors["packing_note"], "too_long");
    }

    #[test]
    fn storage_duration_required_only_when_storage_checked() {
        let specs = service_tab_fields();
        assert!(check_values(&specs, &json!({ "storage_required": false })).is_ok());

        let errors = check_values(&specs, &json!({ "storage_required": true })).unwrap_err();
        assert_eq!(errors["storage_duration_days"], "required");
    }

    #[test]
    fn schema_serializes_with_type_tag() {
        let field = FieldSpec::new("eta", "ETA", FieldKind::Date);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "date");
        assert_eq!(value["name"], "eta");
    }
}
