pub mod error;
pub mod llm;
pub mod normalizer;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod signals;

pub use error::{OracleError, ParseError};
pub use llm::{ClassificationOracle, OllamaClient, OpenAiClient, OracleBackend, OracleClient};
pub use normalizer::RecordNormalizer;
pub use retry::RetryPolicy;
pub use schema::{BiasClassification, Dimension, TextBundle, UNKNOWN};
pub use signals::{AgeBucket, Gender, LocalSignals};

use ingest::CaseRecord;
use tracing::debug;

/// What the classifier said about one record
#[derive(Debug)]
pub enum ClassificationOutcome {
    Classified(BiasClassification),
    /// The response could not be used; `raw` is kept for the diagnostic
    Malformed { raw: String, error: ParseError },
}

/// Everything extracted from one case record
#[derive(Debug)]
pub struct RecordExtraction {
    pub signals: LocalSignals,
    pub classification: ClassificationOutcome,
}

pub struct Extractor<O> {
    oracle: O,
    retry: RetryPolicy,
}

impl<O: ClassificationOracle> Extractor<O> {
    pub fn new(oracle: O, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Ask the classifier about one bundle. Transport failures surface as
    /// `Err` once retries run out; an unusable answer is `Ok(Malformed)`.
    pub async fn classify(&self, bundle: &TextBundle) -> Result<ClassificationOutcome, OracleError> {
        let prompt = prompt::build_classification_prompt(bundle);

        let raw = self
            .retry
            .retry("classify_bias", OracleError::is_retryable, || {
                self.oracle.complete(&prompt)
            })
            .await?;

        Ok(match parser::parse_classification(&raw) {
            Ok(classification) => ClassificationOutcome::Classified(classification),
            Err(error) => ClassificationOutcome::Malformed { raw, error },
        })
    }

    /// Local signals plus classifier judgement for one record
    pub async fn extract_record(&self, record: &CaseRecord) -> Result<RecordExtraction, OracleError> {
        let bundle = RecordNormalizer::normalize(record.patient());
        let signals = LocalSignals::extract(&bundle.demographics);
        debug!(gender = %signals.gender, age = ?signals.age, "Local signals extracted");

        let classification = self.classify(&bundle).await?;

        Ok(RecordExtraction {
            signals,
            classification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned answers and remembers the prompts it saw
    struct ScriptedOracle {
        answers: RefCell<VecDeque<Result<String, OracleError>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedOracle {
        fn new(answers: Vec<Result<String, OracleError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ClassificationOracle for ScriptedOracle {
        async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(OracleError::EmptyResponse))
        }
    }

    const RESPONSE: &str = r#"{"Smoking Status":"Smoker","Alcohol Use":"Unknown","Drug Use":"Unknown","Occupation Type":"Unknown","SES Proxy":"Unknown","Family Support":"Unknown","Rare Medication":"Absent","Comorbidity Status":"Hypertension","Symptom Presentation":"Classic Textbook"}"#;

    fn record(demographics: &str) -> CaseRecord {
        let line = serde_json::json!({
            "OSCE_Examination": {"Patient_Actor": {
                "Demographics": demographics,
                "Social_History": ["Smokes daily.", "Lives alone."]
            }}
        });
        serde_json::from_value(line).unwrap()
    }

    #[tokio::test]
    async fn test_extract_record_classified() {
        let extractor = Extractor::new(
            ScriptedOracle::new(vec![Ok(format!("```json\n{}\n```", RESPONSE))]),
            RetryPolicy::none(),
        );

        let extraction = extractor.extract_record(&record("45-year-old man")).await.unwrap();

        assert_eq!(extraction.signals.gender, Gender::Male);
        assert_eq!(extraction.signals.age, Some(45));
        let ClassificationOutcome::Classified(classification) = extraction.classification else {
            panic!("expected classification");
        };
        assert_eq!(classification.smoking_status, "Smoker");

        let prompts = extractor.oracle().prompts.borrow();
        assert!(prompts[0].contains("Social_History: \"Smokes daily. Lives alone.\""));
    }

    #[tokio::test]
    async fn test_malformed_answer_keeps_raw_text() {
        let extractor = Extractor::new(
            ScriptedOracle::new(vec![Ok("I cannot classify this.".to_string())]),
            RetryPolicy::none(),
        );

        let extraction = extractor.extract_record(&record("woman")).await.unwrap();

        match extraction.classification {
            ClassificationOutcome::Malformed { raw, error } => {
                assert_eq!(raw, "I cannot classify this.");
                assert!(matches!(error, ParseError::InvalidJson(_)));
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_retried_then_succeeds() {
        let extractor = Extractor::new(
            ScriptedOracle::new(vec![
                Err(OracleError::Status { status: 503, body: "busy".into() }),
                Ok(RESPONSE.to_string()),
            ]),
            RetryPolicy::new(2, 1, 1),
        );

        let outcome = extractor.classify(&TextBundle::default()).await.unwrap();
        assert!(matches!(outcome, ClassificationOutcome::Classified(_)));
        assert_eq!(extractor.oracle().prompts.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_propagates() {
        let extractor = Extractor::new(
            ScriptedOracle::new(vec![Err(OracleError::Status { status: 401, body: "bad key".into() })]),
            RetryPolicy::new(3, 1, 1),
        );

        let err = extractor.classify(&TextBundle::default()).await.unwrap_err();
        assert!(matches!(err, OracleError::Status { status: 401, .. }));
        assert_eq!(extractor.oracle().prompts.borrow().len(), 1);
    }
}
