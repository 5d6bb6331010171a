use std::fmt::Write;

use extract::Dimension;

use crate::{BiasTally, FrequencyTable};

fn dimension_title(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::SmokingStatus => "Smoking status",
        Dimension::AlcoholUse => "Alcohol use",
        Dimension::DrugUse => "Drug use",
        Dimension::OccupationType => "Occupation type",
        Dimension::SesProxy => "SES proxy",
        Dimension::FamilySupport => "Family support",
        Dimension::RareMedication => "Rare medication",
        Dimension::ComorbidityStatus => "Comorbidity status",
        Dimension::SymptomPresentation => "Symptom presentation",
    }
}

fn write_section(out: &mut String, title: &str, table: &FrequencyTable) {
    let _ = writeln!(out, "\n{} counts:", title);
    for (label, count) in table.iter() {
        let _ = writeln!(out, "{}: {}", label, count);
    }
}

/// Eleven `label: count` sections: gender, age group, then the nine
/// dimensions. Labels appear in first-seen order.
pub fn render_report(tally: &BiasTally) -> String {
    let mut out = String::new();

    write_section(&mut out, "Gender", tally.gender());
    write_section(&mut out, "Age group", tally.age());
    for dimension in Dimension::ALL {
        write_section(&mut out, dimension_title(dimension), tally.dimension(dimension));
    }

    out
}
