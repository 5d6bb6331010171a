use ingest::{FieldValue, PatientActor};
use serde_json::Value;

use crate::schema::TextBundle;

/// Flattens the four free-text patient fields into plain strings.
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn normalize(patient: &PatientActor) -> TextBundle {
        TextBundle {
            demographics: normalize_field(patient.demographics.as_ref()),
            social_history: normalize_field(patient.social_history.as_ref()),
            past_medical_history: normalize_field(patient.past_medical_history.as_ref()),
            history_of_present_illness: normalize_field(
                patient.history_of_present_illness.as_ref(),
            ),
        }
    }
}

/// Render one field as trimmed text. A missing field is empty text.
pub fn normalize_field(field: Option<&FieldValue>) -> String {
    let text = match field {
        None => String::new(),
        Some(FieldValue::Text(text)) => text.clone(),
        Some(FieldValue::Sequence(items)) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(" "),
        Some(FieldValue::Mapping(map)) => map
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value_text(value)))
            .collect::<Vec<_>>()
            .join(" "),
        Some(FieldValue::Other(value)) => value_text(value),
    };

    text.trim().to_string()
}

// Strings lose their JSON quotes; everything else is rendered as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
