use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One line of the corpus. Only the patient actor is read; the rest of the
/// examination (doctor objectives, test results, ...) is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "OSCE_Examination")]
    pub examination: Examination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Examination {
    #[serde(rename = "Patient_Actor")]
    pub patient_actor: PatientActor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientActor {
    #[serde(rename = "Demographics", default)]
    pub demographics: Option<FieldValue>,
    #[serde(rename = "Social_History", default)]
    pub social_history: Option<FieldValue>,
    #[serde(rename = "Past_Medical_History", default)]
    pub past_medical_history: Option<FieldValue>,
    #[serde(rename = "History_of_Present_Illness", default)]
    pub history_of_present_illness: Option<FieldValue>,
}

/// Shape of a free-text patient field. The corpus is not consistent: the same
/// key holds a sentence in one record, a list of fragments in another and a
/// labelled object in a third.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Sequence(Vec<Value>),
    Mapping(Map<String, Value>),
    /// Numbers, booleans and null
    Other(Value),
}

impl CaseRecord {
    pub fn patient(&self) -> &PatientActor {
        &self.examination.patient_actor
    }
}
