//! Read-only sanity checks over a reshaped table.

use surveykit_io_xlsx::{EnumCellValue, SpecCellTable};

use crate::spec::{
    EnumDuplicatePolicy, SpecGroupCheck, SpecHeaderCheck, SpecVerifyOptions, SpecVerifyReport,
    VerifyError,
};
use crate::util::{derive_effective_count, get_cell, parse_member_count};

struct SpecGroupCursor<'a> {
    row_num: usize,
    n_wanted: i64,
    n_got: usize,
    row_starter: &'a [EnumCellValue],
}

impl SpecGroupCursor<'_> {
    fn finish(&self) -> SpecGroupCheck {
        SpecGroupCheck {
            row_num: self.row_num,
            n_wanted: self.n_wanted,
            n_got: self.n_got,
            if_match: self.n_got == derive_effective_count(self.n_wanted),
        }
    }
}

/// Check a table produced with [`EnumDuplicatePolicy::FirstOnly`].
///
/// Two checks run:
/// 1. The headers at the last kept block column and the first suffix column
///    must not contain `header_sentinel` (a discarded block column leaking
///    through the block boundary).
/// 2. Rows are grouped by non-blank column 0; each group's size is compared
///    with the member count on its first row.
///
/// Returns [`VerifyError::UnsupportedPolicy`] for any other policy and
/// [`VerifyError::PolicyInconsistent`] when the rows look like full-duplicate
/// output, instead of reporting a wall of mismatches.
pub fn verify_reshaped_table(
    table: &SpecCellTable,
    options: &SpecVerifyOptions,
) -> Result<SpecVerifyReport, VerifyError> {
    if options.rule_duplicate != EnumDuplicatePolicy::FirstOnly {
        return Err(VerifyError::UnsupportedPolicy(options.rule_duplicate));
    }
    let layout = &options.layout;
    layout.validate().map_err(VerifyError::InvalidLayout)?;
    if table.is_empty() {
        return Err(VerifyError::EmptyInput);
    }

    let header_check = check_boundary_headers(table, options)?;

    let mut l_groups = Vec::new();
    let mut l_warnings = Vec::new();
    let mut n_rows_orphan = 0usize;
    let mut cursor: Option<SpecGroupCursor<'_>> = None;

    for (n_idx_row, row) in table.rows.iter().enumerate() {
        let n_row_num = n_idx_row + 2;
        if get_cell(row, 0).is_blank() {
            match cursor.as_mut() {
                Some(group) => group.n_got += 1,
                None => n_rows_orphan += 1,
            }
            continue;
        }

        if let Some(group_prev) = cursor.take() {
            if group_prev.n_got == 1
                && group_prev.n_wanted > 1
                && is_same_prefix(group_prev.row_starter, row, layout.prefix_len)
            {
                return Err(VerifyError::PolicyInconsistent { row_num: n_row_num });
            }
            l_groups.push(group_prev.finish());
        }

        let n_wanted = match parse_member_count(get_cell(row, layout.col_member_count)) {
            Ok(n_wanted) => n_wanted,
            Err(c_value) => {
                l_warnings.push(format!(
                    "Row {n_row_num}: Could not parse member count '{c_value}'. Defaulting to 0."
                ));
                0
            }
        };
        cursor = Some(SpecGroupCursor {
            row_num: n_row_num,
            n_wanted,
            n_got: 1,
            row_starter: row,
        });
    }
    if let Some(group_last) = cursor {
        l_groups.push(group_last.finish());
    }
    if n_rows_orphan > 0 {
        l_warnings.push(format!(
            "{n_rows_orphan} rows precede the first household row and belong to no group."
        ));
    }

    Ok(SpecVerifyReport {
        header_check,
        groups: l_groups,
        warnings: l_warnings,
    })
}

fn check_boundary_headers(
    table: &SpecCellTable,
    options: &SpecVerifyOptions,
) -> Result<SpecHeaderCheck, VerifyError> {
    let n_col_suffix_first = options.layout.prefix_len + options.layout.keep_block_len;
    if table.width() <= n_col_suffix_first {
        return Err(VerifyError::HeaderTooNarrow {
            width: table.width(),
            required: n_col_suffix_first,
        });
    }

    let header_block_last = table.header[n_col_suffix_first - 1].to_text();
    let header_suffix_first = table.header[n_col_suffix_first].to_text();
    let c_sentinel = options.header_sentinel.as_str();
    let if_pass = c_sentinel.is_empty()
        || !(header_block_last.contains(c_sentinel) || header_suffix_first.contains(c_sentinel));

    Ok(SpecHeaderCheck {
        header_block_last,
        header_suffix_first,
        if_pass,
    })
}

fn is_same_prefix(row_a: &[EnumCellValue], row_b: &[EnumCellValue], prefix_len: usize) -> bool {
    (0..prefix_len).all(|n_idx| get_cell(row_a, n_idx) == get_cell(row_b, n_idx))
}
