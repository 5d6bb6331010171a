use anyhow::{Context, Result};
use extract::{ClassificationOracle, ClassificationOutcome, Extractor};
use ingest::{CaseRecord, RecordReader};
use std::path::Path;
use tally::BiasTally;
use tracing::{debug, info, warn};

use crate::metrics::{RunMetrics, TimedOperation};

/// How one record ended up in the tally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Classified,
    /// Classifier output was unusable; only gender/age were counted
    Skipped,
}

/// Count one record. Gender/age are counted even when the classifier answer
/// is skipped; the nine dimensions are counted together or not at all. A
/// transport failure is returned as `Err` and nothing is counted.
pub async fn process_record<O: ClassificationOracle>(
    extractor: &Extractor<O>,
    record: &CaseRecord,
    record_index: usize,
    tally: &mut BiasTally,
    metrics: &mut RunMetrics,
) -> Result<RecordOutcome> {
    let timer = TimedOperation::start();
    let extraction = extractor
        .extract_record(record)
        .await
        .context(format!("Classifier request failed for record {}", record_index))?;

    tally.record_signals(&extraction.signals);
    metrics.record_read(extraction.signals.age.is_some());

    let outcome = match extraction.classification {
        ClassificationOutcome::Classified(classification) => {
            tally.record_classification(&classification);
            RecordOutcome::Classified
        }
        ClassificationOutcome::Malformed { raw, error } => {
            warn!(
                record = record_index,
                error = %error,
                raw_output = %raw,
                "Malformed classifier output, skipping record"
            );
            RecordOutcome::Skipped
        }
    };
    metrics.record_oracle_call(timer.elapsed(), outcome == RecordOutcome::Classified);

    debug!(record = record_index, outcome = ?outcome, "Record processed");
    Ok(outcome)
}

/// Stream the corpus through the extractor, in file order, one classifier
/// call at a time.
pub async fn run_audit<O: ClassificationOracle>(
    extractor: &Extractor<O>,
    input: &Path,
    limit: Option<usize>,
    tally: &mut BiasTally,
) -> Result<RunMetrics> {
    let mut reader = RecordReader::open(input).await?;
    let mut metrics = RunMetrics::new();
    let mut processed = 0;

    loop {
        if limit.is_some_and(|limit| processed >= limit) {
            info!(limit = processed, "Record limit reached");
            break;
        }
        let Some(record) = reader.next_record().await? else {
            break;
        };
        processed += 1;

        process_record(extractor, &record, reader.line_number(), tally, &mut metrics).await?;

        if processed % 50 == 0 {
            info!(records = processed, "Progress");
        }
    }

    Ok(metrics)
}
