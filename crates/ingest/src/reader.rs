use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::record::CaseRecord;

/// Streams case records from a JSON Lines file, one record per line. The
/// file name is not inspected; `cases.txt` or a bare `cases` read the same.
pub struct RecordReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl RecordReader {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .context(format!("Failed to open corpus file: {:?}", path))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }

    /// Read the next record. Blank lines are skipped; a line that does not
    /// deserialize is an error carrying its line number.
    pub async fn next_record(&mut self) -> Result<Option<CaseRecord>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read corpus line")?
        {
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str(&line)
                .context(format!("Failed to parse case record on line {}", self.line_number))?;
            return Ok(Some(record));
        }

        Ok(None)
    }

    /// 1-based number of the last line read
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
