//! Reshape specification models and top-level error types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use surveykit_io_xlsx::{EnumCellValue, SpecCellTable};

use crate::conf::{
    C_HEADER_SENTINEL_DEFAULT, N_BLOCK_SIZE, N_COL_GN_ID, N_COL_HOUSEHOLD_ID, N_COL_MEMBER_COUNT,
    N_KEEP_BLOCK_LEN, N_NUM_BLOCKS, N_OFFSET_MEMBER_AGE, N_OFFSET_MEMBER_ID,
    N_OFFSET_MEMBER_NAME, N_PREFIX_LEN, TUP_COLS_CONTACT,
};
use crate::report::ReportReshape;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// How household prefix/suffix cells are replicated across member rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDuplicatePolicy {
    /// Every member row repeats the full prefix and suffix.
    #[default]
    All,
    /// Only the first member row carries prefix/suffix; later rows are blank there.
    FirstOnly,
}

impl EnumDuplicatePolicy {
    /// Configuration string (`"all"` / `"first_only"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::FirstOnly => "first_only",
        }
    }
}

impl fmt::Display for EnumDuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnumDuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "first_only" | "first-only" => Ok(Self::FirstOnly),
            other => Err(format!(
                "Unknown duplicate policy {other:?}; expected \"all\" or \"first_only\"."
            )),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Layout

/// Column layout of the wide household sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHouseholdLayout {
    /// Household-level columns before the member blocks.
    pub prefix_len: usize,
    /// Columns per member block.
    pub block_size: usize,
    /// Number of member blocks.
    pub num_blocks: usize,
    /// Leading block columns kept per member row.
    pub keep_block_len: usize,
    /// Member count column.
    pub col_member_count: usize,
    /// Grama Niladhari ID column.
    pub col_gn_id: usize,
    /// Household ID column.
    pub col_household_id: usize,
    /// Contact columns, highest priority first.
    pub cols_contact: Vec<usize>,
    /// Block-relative member ID offset.
    pub offset_member_id: usize,
    /// Block-relative member name offset.
    pub offset_member_name: usize,
    /// Block-relative member age offset.
    pub offset_member_age: usize,
}

impl Default for SpecHouseholdLayout {
    fn default() -> Self {
        Self {
            prefix_len: N_PREFIX_LEN,
            block_size: N_BLOCK_SIZE,
            num_blocks: N_NUM_BLOCKS,
            keep_block_len: N_KEEP_BLOCK_LEN,
            col_member_count: N_COL_MEMBER_COUNT,
            col_gn_id: N_COL_GN_ID,
            col_household_id: N_COL_HOUSEHOLD_ID,
            cols_contact: TUP_COLS_CONTACT.to_vec(),
            offset_member_id: N_OFFSET_MEMBER_ID,
            offset_member_name: N_OFFSET_MEMBER_NAME,
            offset_member_age: N_OFFSET_MEMBER_AGE,
        }
    }
}

impl SpecHouseholdLayout {
    /// First suffix column (`prefix_len + block_size * num_blocks`).
    pub fn suffix_start(&self) -> usize {
        self.prefix_len + self.block_size * self.num_blocks
    }

    /// First column of member block `idx_block`.
    pub fn block_start(&self, idx_block: usize) -> usize {
        self.prefix_len + idx_block * self.block_size
    }

    /// Check internal consistency of the offsets.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_blocks == 0 {
            return Err("num_blocks must be >= 1.".to_string());
        }
        if self.keep_block_len == 0 || self.keep_block_len > self.block_size {
            return Err(format!(
                "keep_block_len must be in 1..={} (got {}).",
                self.block_size, self.keep_block_len
            ));
        }
        for (c_name, n_offset) in [
            ("offset_member_id", self.offset_member_id),
            ("offset_member_name", self.offset_member_name),
            ("offset_member_age", self.offset_member_age),
        ] {
            if n_offset >= self.keep_block_len {
                return Err(format!(
                    "{c_name}={n_offset} falls outside the kept block columns (keep_block_len={}).",
                    self.keep_block_len
                ));
            }
        }

        let mut l_cols_household = vec![
            ("col_member_count", self.col_member_count),
            ("col_gn_id", self.col_gn_id),
            ("col_household_id", self.col_household_id),
        ];
        l_cols_household.extend(self.cols_contact.iter().map(|n_col| ("cols_contact", *n_col)));
        for (c_name, n_col) in l_cols_household {
            if n_col >= self.prefix_len {
                return Err(format!(
                    "{c_name}={n_col} falls outside the prefix zone (prefix_len={}).",
                    self.prefix_len
                ));
            }
        }
        Ok(())
    }

    /// Fail when a header is narrower than the prefix and all member blocks.
    pub fn validate_header_width(&self, width: usize) -> Result<(), ReshapeError> {
        let n_required = self.suffix_start();
        if width < n_required {
            return Err(ReshapeError::HeaderTooNarrow {
                width,
                required: n_required,
            });
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReshapeModels

/// Input options for `expand_household_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReshapeOptions {
    /// Sheet layout.
    pub layout: SpecHouseholdLayout,
    /// Prefix/suffix replication policy.
    pub rule_duplicate: EnumDuplicatePolicy,
    /// Collect members with missing name/age.
    pub if_report_missing: bool,
}

impl Default for SpecReshapeOptions {
    fn default() -> Self {
        Self {
            layout: SpecHouseholdLayout::default(),
            rule_duplicate: EnumDuplicatePolicy::All,
            if_report_missing: true,
        }
    }
}

/// `{name, age}` pair in the "All Members" JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecMemberSummary {
    /// Member name, `""` when blank.
    pub name: String,
    /// Member age as text, `""` when blank.
    pub age: String,
}

/// One member whose ID is present but name or age is blank.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMissingMemberEntry {
    /// Excel row number of the source household.
    pub row_num: usize,
    /// Household Grama Niladhari ID.
    pub gn_id: EnumCellValue,
    /// Household ID.
    pub household_id: EnumCellValue,
    /// Member ID.
    pub member_id: EnumCellValue,
    /// Member name (blank when missing).
    pub name: EnumCellValue,
    /// Member age (blank when missing).
    pub age: EnumCellValue,
    /// First non-blank contact column, `None` when all are blank.
    pub contact_no: EnumCellValue,
    /// JSON array of the household's member summaries.
    pub all_members_json: String,
}

impl SpecMissingMemberEntry {
    /// Cells of the missing-data report row.
    pub fn to_row(&self) -> Vec<EnumCellValue> {
        vec![
            self.gn_id.clone(),
            self.household_id.clone(),
            self.member_id.clone(),
            self.name.clone(),
            self.age.clone(),
            self.contact_no.clone(),
            EnumCellValue::String(self.all_members_json.clone()),
        ]
    }
}

/// Result of one expansion run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecReshapeOutput {
    /// Long-format table (one row per member).
    pub table: SpecCellTable,
    /// Members with missing name/age, in input order.
    pub missing_entries: Vec<SpecMissingMemberEntry>,
    /// Counters and diagnostics.
    pub report: ReportReshape,
}

/// "Top-level call failed" errors of the expander.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReshapeError {
    /// Input sheet had no rows at all.
    #[error("No data found.")]
    EmptyInput,
    /// Layout offsets are inconsistent.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    /// Header does not reach the suffix zone.
    #[error("Header has {width} columns; layout requires at least {required}.")]
    HeaderTooNarrow {
        /// Actual header width.
        width: usize,
        /// Minimum width required by the layout.
        required: usize,
    },
    /// Member summary could not be encoded as JSON.
    #[error("Failed to encode member summary: {0}")]
    SummaryEncoding(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region VerifyModels

/// Input options for `verify_reshaped_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVerifyOptions {
    /// Layout the expander ran with.
    pub layout: SpecHouseholdLayout,
    /// Duplicate policy the expander ran with.
    pub rule_duplicate: EnumDuplicatePolicy,
    /// Substring that must not appear at the block/suffix boundary headers.
    pub header_sentinel: String,
}

impl Default for SpecVerifyOptions {
    fn default() -> Self {
        Self {
            layout: SpecHouseholdLayout::default(),
            rule_duplicate: EnumDuplicatePolicy::FirstOnly,
            header_sentinel: C_HEADER_SENTINEL_DEFAULT.to_string(),
        }
    }
}

/// Boundary header check outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderCheck {
    /// Header text of the last kept block column.
    pub header_block_last: String,
    /// Header text of the first suffix column (empty when there is no suffix).
    pub header_suffix_first: String,
    /// `true` when neither header contains the sentinel.
    pub if_pass: bool,
}

/// Wanted vs got size of one household group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecGroupCheck {
    /// Excel row number of the group starter.
    pub row_num: usize,
    /// Member count recorded on the starter row.
    pub n_wanted: i64,
    /// Rows in the group, starter included.
    pub n_got: usize,
    /// `n_got == max(1, n_wanted)`.
    pub if_match: bool,
}

impl fmt::Display for SpecGroupCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row {}: Wanted {}, Got {} -> {}",
            self.row_num,
            self.n_wanted,
            self.n_got,
            if self.if_match { "MATCH" } else { "MISMATCH" }
        )
    }
}

/// Verifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVerifyReport {
    /// Boundary header check.
    pub header_check: SpecHeaderCheck,
    /// One entry per household group, in row order.
    pub groups: Vec<SpecGroupCheck>,
    /// Non-fatal observations (orphan rows, unparseable counts).
    pub warnings: Vec<String>,
}

impl SpecVerifyReport {
    /// Number of groups whose size does not match.
    pub fn cnt_mismatch(&self) -> usize {
        self.groups.iter().filter(|group| !group.if_match).count()
    }

    /// `true` when the header check passed and every group matched.
    pub fn is_ok(&self) -> bool {
        self.header_check.if_pass && self.cnt_mismatch() == 0
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} header={} groups={} mismatched={} warnings={}",
            if self.header_check.if_pass { "ok" } else { "failed" },
            self.groups.len(),
            self.cnt_mismatch(),
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecVerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[VERIFY]"))
    }
}

/// "Top-level call failed" errors of the verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Reformatted sheet had no rows at all.
    #[error("No data found.")]
    EmptyInput,
    /// Layout offsets are inconsistent.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    /// Group checks only work when continuation rows have blank prefixes.
    #[error("Verifier requires duplicate policy \"first_only\"; got {0:?}.")]
    UnsupportedPolicy(EnumDuplicatePolicy),
    /// Header does not reach the first suffix column.
    #[error("Header has {width} columns; boundary check needs column index {required}.")]
    HeaderTooNarrow {
        /// Actual header width.
        width: usize,
        /// Boundary column index that must exist.
        required: usize,
    },
    /// Data looks like it was produced with duplicate policy "all".
    #[error(
        "Row {row_num} repeats the household prefix of the previous row; \
         data looks like duplicate policy \"all\" output."
    )]
    PolicyInconsistent {
        /// Excel row number where the repeat was detected.
        row_num: usize,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_policy_parses_config_strings() {
        assert_eq!("all".parse::<EnumDuplicatePolicy>(), Ok(EnumDuplicatePolicy::All));
        assert_eq!(
            " First_Only ".parse::<EnumDuplicatePolicy>(),
            Ok(EnumDuplicatePolicy::FirstOnly)
        );
        assert!("both".parse::<EnumDuplicatePolicy>().is_err());
        assert_eq!(EnumDuplicatePolicy::FirstOnly.to_string(), "first_only");
    }

    #[test]
    fn test_default_layout_is_valid_and_ends_blocks_at_550() {
        let layout = SpecHouseholdLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.suffix_start(), 550);
        assert_eq!(layout.block_start(14), 518);
    }

    #[test]
    fn test_layout_rejects_household_column_outside_prefix() {
        let layout = SpecHouseholdLayout {
            cols_contact: vec![62, 70],
            ..Default::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(err.contains("cols_contact=70"), "{err}");
    }

    #[test]
    fn test_layout_rejects_member_offset_outside_kept_columns() {
        let layout = SpecHouseholdLayout {
            keep_block_len: 2,
            ..Default::default()
        };
        assert!(layout.validate().unwrap_err().contains("offset_member_age"));
    }

    #[test]
    fn test_header_width_below_suffix_start_is_rejected() {
        let layout = SpecHouseholdLayout::default();
        assert_eq!(
            layout.validate_header_width(549),
            Err(ReshapeError::HeaderTooNarrow {
                width: 549,
                required: 550
            })
        );
        assert!(layout.validate_header_width(550).is_ok());
    }
}
