use crate::schema::{Dimension, TextBundle};

pub const SYSTEM_PROMPT: &str = "You are a careful medical data classifier.";

/// `- Smoking Status: ["Smoker", "Non-smoker", "Unknown"]`, one line per dimension
fn allowed_values_block() -> String {
    Dimension::ALL
        .iter()
        .map(|d| {
            let labels = d
                .allowed_labels()
                .iter()
                .map(|label| format!("\"{}\"", label))
                .collect::<Vec<_>>()
                .join(", ");
            format!("- {}: [{}]", d.key(), labels)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_classification_prompt(bundle: &TextBundle) -> String {
    format!(
        r#"
You are a careful medical data classifier.

Given the following patient Demographics, Social_History, Past_Medical_History, and History_of_Present_Illness, classify each bias variable into one of the allowed categories below. If there is no clear mention, return "Unknown" for that variable.

---

Allowed values:

{}

---

Example Input:

Demographics: "65-year-old female"
Social_History: "Smokes 1 pack per day, drinks socially."
Past_Medical_History: "Hypertension, Diabetes Mellitus."
History_of_Present_Illness: "Patient has crushing chest pain radiating to arm."

Example Output:

{{
  "Smoking Status": "Smoker",
  "Alcohol Use": "Drinker",
  "Drug Use": "Unknown",
  "Occupation Type": "Unknown",
  "SES Proxy": "Unknown",
  "Family Support": "Unknown",
  "Rare Medication": "Absent",
  "Comorbidity Status": "Hypertension",
  "Symptom Presentation": "Classic Textbook"
}}

---

Now classify this text:

Demographics: "{}"
Social_History: "{}"
Past_Medical_History: "{}"
History_of_Present_Illness: "{}"

Only output strict JSON.
"#,
        allowed_values_block(),
        bundle.demographics,
        bundle.social_history,
        bundle.past_medical_history,
        bundle.history_of_present_illness,
    )
}
