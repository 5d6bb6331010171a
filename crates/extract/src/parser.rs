use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::schema::{BiasClassification, Dimension};

/// Remove a surrounding Markdown code fence (```` ```json ```` ... ```` ``` ````)
/// if the classifier wrapped its answer in one.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag along with the opening marker
        text = match rest.find('\n') {
            Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[newline + 1..]
            }
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse raw classifier output into a classification. Extra keys are ignored;
/// every dimension key must be present and hold a string.
pub fn parse_classification(raw: &str) -> Result<BiasClassification, ParseError> {
    let json = strip_code_fence(raw);

    let object: Map<String, Value> = serde_json::from_str(json).map_err(ParseError::InvalidJson)?;

    if let Some(missing) = Dimension::ALL
        .iter()
        .find(|d| !object.contains_key(d.key()))
    {
        return Err(ParseError::MissingKey(missing.key().to_string()));
    }

    serde_json::from_value(Value::Object(object)).map_err(ParseError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{"Smoking Status":"Smoker","Alcohol Use":"Unknown","Drug Use":"Unknown","Occupation Type":"Unknown","SES Proxy":"Unknown","Family Support":"Unknown","Rare Medication":"Absent","Comorbidity Status":"Hypertension","Symptom Presentation":"Classic Textbook"}"#;

    #[test]
    fn test_parses_bare_json() {
        let classification = parse_classification(RESPONSE).unwrap();

        assert_eq!(classification.smoking_status, "Smoker");
        assert_eq!(classification.rare_medication, "Absent");
        assert_eq!(classification.comorbidity_status, "Hypertension");
        assert_eq!(classification.symptom_presentation, "Classic Textbook");
    }

    #[test]
    fn test_fenced_output_parses_identically() {
        let fenced = format!("```json\n{}\n```", RESPONSE);
        let untagged = format!("```\n{}\n```\n", RESPONSE);

        let bare = parse_classification(RESPONSE).unwrap();
        assert_eq!(parse_classification(&fenced).unwrap(), bare);
        assert_eq!(parse_classification(&untagged).unwrap(), bare);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json{}```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn test_prose_is_invalid_json() {
        let err = parse_classification("I cannot classify this.").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let partial = r#"{"Smoking Status": "Smoker", "Alcohol Use": "Drinker"}"#;
        let err = parse_classification(partial).unwrap_err();
        assert!(matches!(err, ParseError::MissingKey(ref key) if key == "Drug Use"));
    }

    #[test]
    fn test_out_of_vocabulary_labels_still_parse() {
        let response = RESPONSE.replace("\"Smoker\"", "\"Former Smoker\"");
        let classification = parse_classification(&response).unwrap();
        assert_eq!(classification.smoking_status, "Former Smoker");
    }

    #[test]
    fn test_extra_keys_ignored() {
        let response = RESPONSE.replace('}', r#","Confidence":"High"}"#);
        assert!(parse_classification(&response).is_ok());
    }
}
