pub mod reader;
pub mod record;

pub use reader::RecordReader;
pub use record::{CaseRecord, Examination, FieldValue, PatientActor};

use anyhow::Result;
use std::path::Path;

/// Load a whole corpus into memory. The audit itself streams through
/// [`RecordReader`]; this is for small fixtures and one-off inspection.
pub async fn read_corpus(path: &Path) -> Result<Vec<CaseRecord>> {
    let mut reader = RecordReader::open(path).await?;
    let mut records = Vec::new();

    while let Some(record) = reader.next_record().await? {
        records.push(record);
    }

    tracing::debug!(path = %path.display(), records = records.len(), "Corpus loaded");
    Ok(records)
}
