use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// The nine categorical axes the classifier is asked to judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    SmokingStatus,
    AlcoholUse,
    DrugUse,
    OccupationType,
    SesProxy,
    FamilySupport,
    RareMedication,
    ComorbidityStatus,
    SymptomPresentation,
}

impl Dimension {
    pub const ALL: [Dimension; 9] = [
        Dimension::SmokingStatus,
        Dimension::AlcoholUse,
        Dimension::DrugUse,
        Dimension::OccupationType,
        Dimension::SesProxy,
        Dimension::FamilySupport,
        Dimension::RareMedication,
        Dimension::ComorbidityStatus,
        Dimension::SymptomPresentation,
    ];

    /// JSON key the classifier must answer with
    pub fn key(self) -> &'static str {
        match self {
            Dimension::SmokingStatus => "Smoking Status",
            Dimension::AlcoholUse => "Alcohol Use",
            Dimension::DrugUse => "Drug Use",
            Dimension::OccupationType => "Occupation Type",
            Dimension::SesProxy => "SES Proxy",
            Dimension::FamilySupport => "Family Support",
            Dimension::RareMedication => "Rare Medication",
            Dimension::ComorbidityStatus => "Comorbidity Status",
            Dimension::SymptomPresentation => "Symptom Presentation",
        }
    }

    /// Closed label set, `Unknown` last
    pub fn allowed_labels(self) -> &'static [&'static str] {
        match self {
            Dimension::SmokingStatus => &["Smoker", "Non-smoker", UNKNOWN],
            Dimension::AlcoholUse => &["Drinker", "Non-drinker", UNKNOWN],
            Dimension::DrugUse => &["Drug User", "Non-drug User", UNKNOWN],
            Dimension::OccupationType => &[
                "Manual Labor",
                "Knowledge Worker",
                "Student",
                "Retired",
                "Unemployed",
                UNKNOWN,
            ],
            Dimension::SesProxy => &["Lower SES Proxy", "Higher SES Proxy", UNKNOWN],
            Dimension::FamilySupport => &["Strong Support", "Limited/No Support", UNKNOWN],
            Dimension::RareMedication => &["Present", "Absent", UNKNOWN],
            Dimension::ComorbidityStatus => &[
                "Hypertension",
                "Diabetes Mellitus",
                "Cancer",
                "Other",
                "None",
                UNKNOWN,
            ],
            Dimension::SymptomPresentation => &[
                "Classic Textbook",
                "Atypical/Vague Wording",
                "Multi-System Complex",
                "Single Symptom Only",
                UNKNOWN,
            ],
        }
    }

    /// Case-sensitive membership in the closed set
    pub fn allows(self, label: &str) -> bool {
        self.allowed_labels().contains(&label)
    }
}

/// One validated classifier answer. All nine keys are required; a response
/// missing any of them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasClassification {
    #[serde(rename = "Smoking Status")]
    pub smoking_status: String,
    #[serde(rename = "Alcohol Use")]
    pub alcohol_use: String,
    #[serde(rename = "Drug Use")]
    pub drug_use: String,
    #[serde(rename = "Occupation Type")]
    pub occupation_type: String,
    #[serde(rename = "SES Proxy")]
    pub ses_proxy: String,
    #[serde(rename = "Family Support")]
    pub family_support: String,
    #[serde(rename = "Rare Medication")]
    pub rare_medication: String,
    #[serde(rename = "Comorbidity Status")]
    pub comorbidity_status: String,
    #[serde(rename = "Symptom Presentation")]
    pub symptom_presentation: String,
}

impl BiasClassification {
    pub fn get(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::SmokingStatus => &self.smoking_status,
            Dimension::AlcoholUse => &self.alcohol_use,
            Dimension::DrugUse => &self.drug_use,
            Dimension::OccupationType => &self.occupation_type,
            Dimension::SesProxy => &self.ses_proxy,
            Dimension::FamilySupport => &self.family_support,
            Dimension::RareMedication => &self.rare_medication,
            Dimension::ComorbidityStatus => &self.comorbidity_status,
            Dimension::SymptomPresentation => &self.symptom_presentation,
        }
    }

    /// (dimension, label) pairs in catalogue order
    pub fn labels(&self) -> impl Iterator<Item = (Dimension, &str)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Dimensions whose label falls outside the closed set
    pub fn out_of_vocabulary(&self) -> Vec<Dimension> {
        self.labels()
            .filter(|(d, label)| !d.allows(label))
            .map(|(d, _)| d)
            .collect()
    }
}

/// Normalized text of the four patient fields for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBundle {
    pub demographics: String,
    pub social_history: String,
    pub past_medical_history: String,
    pub history_of_present_illness: String,
}
