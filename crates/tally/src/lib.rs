pub mod report;
pub mod table;

pub use report::render_report;
pub use table::FrequencyTable;

use extract::{BiasClassification, Dimension, LocalSignals, UNKNOWN};
use tracing::warn;

/// What to do with a classifier label outside its dimension's closed set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Count it under its own label
    #[default]
    Lenient,
    /// Count it as `Unknown`
    CoerceUnknown,
}

/// The eleven frequency tables of one audit run. Created at run start and
/// passed by `&mut` to each record; never reset.
#[derive(Debug, Clone, Default)]
pub struct BiasTally {
    gender: FrequencyTable,
    age: FrequencyTable,
    dimensions: [FrequencyTable; 9],
    label_policy: LabelPolicy,
}

impl BiasTally {
    pub fn new(label_policy: LabelPolicy) -> Self {
        Self {
            label_policy,
            ..Self::default()
        }
    }

    /// Gender always counts; age only when one was found
    pub fn record_signals(&mut self, signals: &LocalSignals) {
        self.gender.increment(signals.gender.label());
        if let Some(bucket) = signals.age_bucket() {
            self.age.increment(bucket.label());
        }
    }

    /// One increment in each of the nine dimension tables
    pub fn record_classification(&mut self, classification: &BiasClassification) {
        for (dimension, label) in classification.labels() {
            let label = if dimension.allows(label) {
                label
            } else {
                warn!(
                    dimension = dimension.key(),
                    label,
                    policy = ?self.label_policy,
                    "Classifier label outside allowed set"
                );
                match self.label_policy {
                    LabelPolicy::Lenient => label,
                    LabelPolicy::CoerceUnknown => UNKNOWN,
                }
            };
            self.dimensions[dimension_index(dimension)].increment(label);
        }
    }

    pub fn gender(&self) -> &FrequencyTable {
        &self.gender
    }

    pub fn age(&self) -> &FrequencyTable {
        &self.age
    }

    pub fn dimension(&self, dimension: Dimension) -> &FrequencyTable {
        &self.dimensions[dimension_index(dimension)]
    }

    /// Records that reached the dimension tables. Equal across all nine.
    pub fn classified_records(&self) -> u64 {
        self.dimensions[0].total()
    }
}

// Variants are declared in `Dimension::ALL` order
fn dimension_index(dimension: Dimension) -> usize {
    dimension as usize
}
