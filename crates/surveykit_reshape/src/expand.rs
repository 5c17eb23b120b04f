//! Wide-to-long household row expansion.

use surveykit_io_xlsx::{EnumCellValue, SpecCellTable};

use crate::conf::{N_MEMBER_COUNT_MAX, TUP_MISSING_REPORT_HEADER};
use crate::report::ReportReshapeBuilder;
use crate::spec::{
    EnumDuplicatePolicy, ReshapeError, SpecHouseholdLayout, SpecMissingMemberEntry,
    SpecReshapeOptions, SpecReshapeOutput,
};
use crate::util::{
    derive_effective_count, derive_member_summaries, encode_member_summaries, normalize_row_width,
    parse_member_count, resolve_contact_number,
};

/// Expand one-row-per-household `table` into one row per member.
///
/// Each household row yields `max(1, member_count)` output rows. Row `i` keeps
/// the first `keep_block_len` columns of member block `i`, or blanks once `i`
/// runs past the last block. Prefix and suffix cells are repeated or blanked
/// according to [`SpecReshapeOptions::rule_duplicate`].
///
/// Rows are padded or truncated to the header width before slicing. Member
/// count parse failures are non-fatal and recorded in the report.
///
/// Returns [`ReshapeError`] only for empty input and layout/header mismatches.
pub fn expand_household_table(
    table: &SpecCellTable,
    options: &SpecReshapeOptions,
) -> Result<SpecReshapeOutput, ReshapeError> {
    if table.is_empty() {
        return Err(ReshapeError::EmptyInput);
    }
    let layout = &options.layout;
    layout.validate().map_err(ReshapeError::InvalidLayout)?;
    layout.validate_header_width(table.width())?;

    let n_width_in = table.width();
    let n_suffix_start = layout.suffix_start();
    let header = derive_reshaped_header(&table.header, layout)?;

    let l_prefix_blank = vec![EnumCellValue::None; layout.prefix_len];
    let l_suffix_blank = vec![EnumCellValue::None; n_width_in - n_suffix_start];
    let l_block_blank = vec![EnumCellValue::None; layout.keep_block_len];

    let mut builder_report = ReportReshapeBuilder::default();
    let mut l_rows_out: Vec<Vec<EnumCellValue>> = Vec::new();
    let mut l_missing_entries = Vec::new();

    for (n_idx_row, row_raw) in table.rows.iter().enumerate() {
        let n_row_num = n_idx_row + 2;
        builder_report.add_row_input();

        let mut row = row_raw.clone();
        let n_cells_dropped = normalize_row_width(&mut row, n_width_in);
        if n_cells_dropped > 0 {
            builder_report.add_warning(format!(
                "Row {n_row_num}: dropped {n_cells_dropped} cells beyond the header width."
            ));
        }

        let n_members = match parse_member_count(&row[layout.col_member_count]) {
            Ok(n_members) if n_members > N_MEMBER_COUNT_MAX => {
                builder_report.add_parse_failure(format!(
                    "Row {n_row_num}: Member count {n_members} exceeds {N_MEMBER_COUNT_MAX}. Defaulting to 0."
                ));
                0
            }
            Ok(n_members) => n_members,
            Err(c_value) => {
                builder_report.add_parse_failure(format!(
                    "Row {n_row_num}: Could not parse member count '{c_value}'. Defaulting to 0."
                ));
                0
            }
        };
        let n_repeat = derive_effective_count(n_members);
        if n_repeat > layout.num_blocks {
            builder_report.add_household_padded();
        }

        if options.if_report_missing {
            for entry in collect_missing_members(&row, layout, n_row_num, n_repeat)? {
                builder_report.add_member_missing();
                l_missing_entries.push(entry);
            }
        }

        let l_prefix = &row[..layout.prefix_len];
        let l_suffix = &row[n_suffix_start..];
        for idx_member in 0..n_repeat {
            let if_carry_household =
                idx_member == 0 || options.rule_duplicate == EnumDuplicatePolicy::All;
            let (l_prefix_out, l_suffix_out) = if if_carry_household {
                (l_prefix, l_suffix)
            } else {
                (l_prefix_blank.as_slice(), l_suffix_blank.as_slice())
            };
            let l_block_out = if idx_member < layout.num_blocks {
                let n_col_start = layout.block_start(idx_member);
                &row[n_col_start..n_col_start + layout.keep_block_len]
            } else {
                l_block_blank.as_slice()
            };

            let mut l_row_out = Vec::with_capacity(header.len());
            l_row_out.extend_from_slice(l_prefix_out);
            l_row_out.extend_from_slice(l_block_out);
            l_row_out.extend_from_slice(l_suffix_out);
            l_rows_out.push(l_row_out);
        }
        builder_report.add_rows_generated(n_repeat as u64);
    }

    Ok(SpecReshapeOutput {
        table: SpecCellTable::new(header, l_rows_out),
        missing_entries: l_missing_entries,
        report: builder_report.build(),
    })
}

/// Output header: prefix headers, first block's kept headers, suffix headers.
///
/// Fails with [`ReshapeError::HeaderTooNarrow`] when `header` is narrower than
/// [`SpecHouseholdLayout::suffix_start`].
pub fn derive_reshaped_header(
    header: &[EnumCellValue],
    layout: &SpecHouseholdLayout,
) -> Result<Vec<EnumCellValue>, ReshapeError> {
    layout.validate_header_width(header.len())?;
    let n_block_end = layout.prefix_len + layout.keep_block_len;
    let mut l_header = Vec::with_capacity(n_block_end + header.len() - layout.suffix_start());
    l_header.extend_from_slice(&header[..n_block_end]);
    l_header.extend_from_slice(&header[layout.suffix_start()..]);
    Ok(l_header)
}

/// Build the missing-data sheet, or `None` when there is nothing to report.
pub fn derive_missing_report_table(entries: &[SpecMissingMemberEntry]) -> Option<SpecCellTable> {
    if entries.is_empty() {
        return None;
    }
    Some(SpecCellTable::from_text_header(
        &TUP_MISSING_REPORT_HEADER,
        entries.iter().map(SpecMissingMemberEntry::to_row).collect(),
    ))
}

fn collect_missing_members(
    row: &[EnumCellValue],
    layout: &SpecHouseholdLayout,
    n_row_num: usize,
    n_repeat: usize,
) -> Result<Vec<SpecMissingMemberEntry>, ReshapeError> {
    let n_slots = usize::min(n_repeat, layout.num_blocks);
    let l_members_missing: Vec<usize> = (0..n_slots)
        .filter(|idx_block| {
            let n_col_start = layout.block_start(*idx_block);
            !row[n_col_start + layout.offset_member_id].is_blank()
                && (row[n_col_start + layout.offset_member_name].is_blank()
                    || row[n_col_start + layout.offset_member_age].is_blank())
        })
        .collect();
    if l_members_missing.is_empty() {
        return Ok(vec![]);
    }

    let contact_no = resolve_contact_number(row, &layout.cols_contact);
    let c_all_members_json =
        encode_member_summaries(&derive_member_summaries(row, layout, n_slots))
            .map_err(ReshapeError::SummaryEncoding)?;

    Ok(l_members_missing
        .into_iter()
        .map(|idx_block| {
            let n_col_start = layout.block_start(idx_block);
            SpecMissingMemberEntry {
                row_num: n_row_num,
                gn_id: row[layout.col_gn_id].clone(),
                household_id: row[layout.col_household_id].clone(),
                member_id: row[n_col_start + layout.offset_member_id].clone(),
                name: row[n_col_start + layout.offset_member_name].clone(),
                age: row[n_col_start + layout.offset_member_age].clone(),
                contact_no: contact_no.clone(),
                all_members_json: c_all_members_json.clone(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn derive_small_layout() -> SpecHouseholdLayout {
        SpecHouseholdLayout {
            prefix_len: 4,
            block_size: 5,
            num_blocks: 2,
            keep_block_len: 3,
            col_member_count: 3,
            col_gn_id: 0,
            col_household_id: 1,
            cols_contact: vec![2],
            ..Default::default()
        }
    }

    fn cell(c: &str) -> EnumCellValue {
        EnumCellValue::text(c)
    }

    #[test]
    fn test_reshaped_header_keeps_first_block_columns_only() {
        let layout = derive_small_layout();
        let header: Vec<_> = (0..16).map(|n| cell(&format!("h{n}"))).collect();

        let l_header = derive_reshaped_header(&header, &layout).unwrap();

        let l_names: Vec<_> = l_header.iter().map(EnumCellValue::to_text).collect();
        assert_eq!(
            l_names,
            vec!["h0", "h1", "h2", "h3", "h4", "h5", "h6", "h14", "h15"]
        );
    }

    #[test]
    fn test_reshaped_header_rejects_narrow_header() {
        let layout = derive_small_layout();
        let header: Vec<_> = (0..13).map(|n| cell(&format!("h{n}"))).collect();

        assert_eq!(
            derive_reshaped_header(&header, &layout),
            Err(ReshapeError::HeaderTooNarrow {
                width: 13,
                required: 14
            })
        );
    }

    #[test]
    fn test_small_layout_pads_members_beyond_block_count() {
        let options = SpecReshapeOptions {
            layout: derive_small_layout(),
            rule_duplicate: EnumDuplicatePolicy::FirstOnly,
            if_report_missing: false,
        };
        let header: Vec<_> = (0..15).map(|n| cell(&format!("h{n}"))).collect();
        let mut row = vec![EnumCellValue::None; 15];
        row[0] = cell("GN");
        row[3] = EnumCellValue::Number(3.0);
        row[4] = cell("m1");
        row[9] = cell("m2");
        row[14] = cell("tail");
        let table = SpecCellTable::new(header, vec![row]);

        let output = expand_household_table(&table, &options).unwrap();

        assert_eq!(output.table.height(), 3);
        assert_eq!(output.report.cnt_households_padded, 1);
        assert_eq!(output.table.rows[0][4], cell("m1"));
        assert_eq!(output.table.rows[0][7], cell("tail"));
        assert_eq!(output.table.rows[1][0], EnumCellValue::None);
        assert_eq!(output.table.rows[1][4], cell("m2"));
        assert_eq!(output.table.rows[1][7], EnumCellValue::None);
        assert_eq!(output.table.rows[2][4..7], [const { EnumCellValue::None }; 3]);
        assert!(output.missing_entries.is_empty());
    }

    #[test]
    fn test_missing_report_table_is_absent_without_entries() {
        assert_eq!(derive_missing_report_table(&[]), None);
    }
}
