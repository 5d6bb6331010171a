use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(male|man|boy)\b").expect("valid male pattern"));
static FEMALE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(female|woman|girl)\b").expect("valid female pattern"));
static AGE_YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)((?-u:\d)+)[-\s]*year").expect("valid age pattern"));

const NEWBORN_MARKERS: [&str; 3] = ["month", "newborn", "infant"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    OtherUnknown,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::OtherUnknown => "Other/Unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Right-inclusive age bands. `Under10` covers 0..=10, `Over60` starts at 61.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Under10,
    Teens,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    Over60,
}

impl AgeBucket {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=10 => AgeBucket::Under10,
            11..=20 => AgeBucket::Teens,
            21..=30 => AgeBucket::Twenties,
            31..=40 => AgeBucket::Thirties,
            41..=50 => AgeBucket::Forties,
            51..=60 => AgeBucket::Fifties,
            _ => AgeBucket::Over60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under10 => "0-10",
            AgeBucket::Teens => "10-20",
            AgeBucket::Twenties => "20-30",
            AgeBucket::Thirties => "30-40",
            AgeBucket::Forties => "40-50",
            AgeBucket::Fifties => "50-60",
            AgeBucket::Over60 => "60+",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Signals derived locally from the demographics text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSignals {
    pub gender: Gender,
    pub age: Option<u32>,
}

impl LocalSignals {
    pub fn extract(demographics: &str) -> Self {
        Self {
            gender: extract_gender(demographics),
            age: extract_age(demographics),
        }
    }

    pub fn age_bucket(&self) -> Option<AgeBucket> {
        self.age.map(AgeBucket::from_age)
    }
}

/// Whole-word lexicon match; the male lexicon is checked first.
pub fn extract_gender(demographics: &str) -> Gender {
    if MALE.is_match(demographics) {
        Gender::Male
    } else if FEMALE.is_match(demographics) {
        Gender::Female
    } else {
        Gender::OtherUnknown
    }
}

/// Age in years. Newborn markers force 0; otherwise the first number
/// followed by "year" wins, even if a later number is the real age.
pub fn extract_age(demographics: &str) -> Option<u32> {
    let lower = demographics.to_lowercase();
    if NEWBORN_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some(0);
    }

    AGE_YEARS
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        // ASCII digits only, so parsing can fail only on overflow
        .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_lexicons() {
        assert_eq!(extract_gender("45-year-old man with chest pain"), Gender::Male);
        assert_eq!(extract_gender("A 30 year old WOMAN"), Gender::Female);
        assert_eq!(extract_gender("12-year-old girl"), Gender::Female);
        assert_eq!(extract_gender("Boy, 8"), Gender::Male);
        assert_eq!(extract_gender("patient, no age given"), Gender::OtherUnknown);
    }

    #[test]
    fn test_gender_requires_whole_words() {
        // "female" must not satisfy the male lexicon, nor "woman" the "man" entry
        assert_eq!(extract_gender("65 year old female"), Gender::Female);
        assert_eq!(extract_gender("pregnant woman"), Gender::Female);
        assert_eq!(extract_gender("manual laborer"), Gender::OtherUnknown);
    }

    #[test]
    fn test_male_lexicon_wins_when_both_present() {
        assert_eq!(extract_gender("man accompanied by his daughter, a girl"), Gender::Male);
    }

    #[test]
    fn test_age_extraction() {
        let signals = LocalSignals::extract("45-year-old man with chest pain");
        assert_eq!(signals.age, Some(45));
        assert_eq!(signals.age_bucket(), Some(AgeBucket::Forties));

        assert_eq!(extract_age("65 year old female"), Some(65));
        assert_eq!(extract_age("A 7 - Year-old boy"), Some(7));
        assert_eq!(extract_age("patient, no age given"), None);
    }

    #[test]
    fn test_newborn_markers_force_zero() {
        assert_eq!(extract_age("6-month-old infant"), Some(0));
        assert_eq!(extract_age("Newborn male, 3 days"), Some(0));
        assert_eq!(
            LocalSignals::extract("6-month-old infant").age_bucket(),
            Some(AgeBucket::Under10)
        );
    }

    #[test]
    fn test_first_number_before_year_wins() {
        assert_eq!(extract_age("smoked for 20 years, now a 55-year-old man"), Some(20));
    }

    #[test]
    fn test_bucket_boundaries_fall_into_lower_band() {
        assert_eq!(AgeBucket::from_age(10).label(), "0-10");
        assert_eq!(AgeBucket::from_age(11).label(), "10-20");
        assert_eq!(AgeBucket::from_age(20).label(), "10-20");
        assert_eq!(AgeBucket::from_age(60).label(), "50-60");
        assert_eq!(AgeBucket::from_age(61).label(), "60+");
        assert_eq!(LocalSignals::extract("65 year old female").age_bucket(), Some(AgeBucket::Over60));
    }

    #[test]
    fn test_oversized_age_saturates() {
        let age = extract_age("99999999999999999999-year-old");
        assert_eq!(age, Some(u32::MAX));
        assert_eq!(age.map(AgeBucket::from_age), Some(AgeBucket::Over60));
    }

    #[test]
    fn test_non_ascii_digits_are_not_an_age() {
        assert_eq!(extract_age("\u{0664}\u{0665}-year-old man"), None);
        assert_eq!(extract_age("\u{0664}\u{0665} year old, 45-year-old"), Some(45));
    }
}
