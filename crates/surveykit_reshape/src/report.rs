//! Reshape report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one expansion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportReshape {
    /// Input data rows (header excluded).
    pub cnt_rows_input: u64,
    /// Output data rows emitted.
    pub cnt_rows_generated: u64,
    /// Households whose member count exceeded the available blocks.
    pub cnt_households_padded: u64,
    /// Rows whose member count could not be parsed.
    pub cnt_parse_failures: u64,
    /// Members with an ID but a blank name or age.
    pub cnt_members_missing: u64,
    /// Non-fatal diagnostics, in row order.
    pub warnings: Vec<String>,
}

impl ReportReshape {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_input".to_string(), self.cnt_rows_input);
        dict_counts.insert("cnt_rows_generated".to_string(), self.cnt_rows_generated);
        dict_counts.insert(
            "cnt_households_padded".to_string(),
            self.cnt_households_padded,
        );
        dict_counts.insert("cnt_parse_failures".to_string(), self.cnt_parse_failures);
        dict_counts.insert("cnt_members_missing".to_string(), self.cnt_members_missing);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} input={} generated={} padded={} parse_failures={} missing={} warnings={}",
            dict_counts["cnt_rows_input"],
            dict_counts["cnt_rows_generated"],
            dict_counts["cnt_households_padded"],
            dict_counts["cnt_parse_failures"],
            dict_counts["cnt_members_missing"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportReshape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[RESHAPE]"))
    }
}

/// Mutable accumulator for reshape statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportReshapeBuilder {
    /// See [`ReportReshape::cnt_rows_input`].
    pub cnt_rows_input: u64,
    /// See [`ReportReshape::cnt_rows_generated`].
    pub cnt_rows_generated: u64,
    /// See [`ReportReshape::cnt_households_padded`].
    pub cnt_households_padded: u64,
    /// See [`ReportReshape::cnt_parse_failures`].
    pub cnt_parse_failures: u64,
    /// See [`ReportReshape::cnt_members_missing`].
    pub cnt_members_missing: u64,
    /// See [`ReportReshape::warnings`].
    pub warnings: Vec<String>,
}

impl ReportReshapeBuilder {
    /// Increment input row count by one.
    pub fn add_row_input(&mut self) {
        self.cnt_rows_input += 1;
    }

    /// Increment generated row count by `value`.
    pub fn add_rows_generated(&mut self, value: u64) {
        self.cnt_rows_generated += value;
    }

    /// Increment padded household count by one.
    pub fn add_household_padded(&mut self) {
        self.cnt_households_padded += 1;
    }

    /// Record one member-count parse failure with its diagnostic.
    pub fn add_parse_failure(&mut self, warning: String) {
        self.cnt_parse_failures += 1;
        self.warnings.push(warning);
    }

    /// Increment missing member count by one.
    pub fn add_member_missing(&mut self) {
        self.cnt_members_missing += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportReshape {
        ReportReshape {
            cnt_rows_input: self.cnt_rows_input,
            cnt_rows_generated: self.cnt_rows_generated,
            cnt_households_padded: self.cnt_households_padded,
            cnt_parse_failures: self.cnt_parse_failures,
            cnt_members_missing: self.cnt_members_missing,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_reshape_to_dict_and_format_agree() {
        let mut builder = ReportReshapeBuilder::default();
        builder.add_row_input();
        builder.add_row_input();
        builder.add_rows_generated(5);
        builder.add_parse_failure("Row 3: bad".to_string());
        builder.add_member_missing();
        let report = builder.build();

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_rows_input"], 2);
        assert_eq!(dict_counts["cnt_rows_generated"], 5);
        assert_eq!(dict_counts["cnt_parse_failures"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[RESHAPE]");
        assert_eq!(
            txt,
            "[RESHAPE] input=2 generated=5 padded=0 parse_failures=1 missing=1 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }
}
