//! Shared row helpers for the expander and verifier.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use surveykit_io_xlsx::EnumCellValue;

use crate::spec::{SpecHouseholdLayout, SpecMemberSummary};

static CELL_NONE: EnumCellValue = EnumCellValue::None;

/// Cell at `idx`, or a blank cell past the end of the row.
pub fn get_cell(row: &[EnumCellValue], idx: usize) -> &EnumCellValue {
    row.get(idx).unwrap_or(&CELL_NONE)
}

/// Pad `row` with blanks or truncate it to exactly `width` cells.
///
/// Returns the number of dropped cells.
pub fn normalize_row_width(row: &mut Vec<EnumCellValue>, width: usize) -> usize {
    let n_dropped = row.len().saturating_sub(width);
    row.resize(width, EnumCellValue::None);
    n_dropped
}

/// Parse a member count cell, truncating fractional values toward zero.
///
/// Missing and blank cells count as `0`. On failure the offending cell text is
/// returned.
pub fn parse_member_count(value: &EnumCellValue) -> Result<i64, String> {
    match value {
        EnumCellValue::None => Ok(0),
        EnumCellValue::String(s) if s.trim().is_empty() => Ok(0),
        EnumCellValue::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n.trunc() as i64),
            _ => Err(s.clone()),
        },
        EnumCellValue::Number(n) if n.is_finite() => Ok(n.trunc() as i64),
        EnumCellValue::Number(_) | EnumCellValue::DateTime(_) => Err(value.to_text()),
    }
}

/// Rows emitted for a household: at least one, even for zero members.
pub fn derive_effective_count(n_members: i64) -> usize {
    usize::try_from(n_members.max(1)).unwrap_or(1)
}

/// First non-blank cell among `cols_contact`, or a blank cell.
pub fn resolve_contact_number(row: &[EnumCellValue], cols_contact: &[usize]) -> EnumCellValue {
    cols_contact
        .iter()
        .map(|n_col| get_cell(row, *n_col))
        .find(|value| !value.is_blank())
        .cloned()
        .unwrap_or(EnumCellValue::None)
}

/// `{name, age}` of every member slot in `0..n_slots` with a non-blank name or age.
pub fn derive_member_summaries(
    row: &[EnumCellValue],
    layout: &SpecHouseholdLayout,
    n_slots: usize,
) -> Vec<SpecMemberSummary> {
    (0..usize::min(n_slots, layout.num_blocks))
        .filter_map(|idx_block| {
            let n_col_start = layout.block_start(idx_block);
            let name = get_cell(row, n_col_start + layout.offset_member_name);
            let age = get_cell(row, n_col_start + layout.offset_member_age);
            if name.is_blank() && age.is_blank() {
                return None;
            }
            Some(SpecMemberSummary {
                name: derive_field_text(name),
                age: derive_field_text(age),
            })
        })
        .collect()
}

fn derive_field_text(value: &EnumCellValue) -> String {
    if value.is_blank() {
        String::new()
    } else {
        value.to_text()
    }
}

/// Compact JSON with `", "` between items and `": "` after keys.
struct SpacedSeparatorFormatter;

impl Formatter for SpacedSeparatorFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Encode member summaries as a single-line JSON array.
///
/// Items are separated by `", "` and keys by `": "`. Non-ASCII text is kept
/// as-is.
pub fn encode_member_summaries(summaries: &[SpecMemberSummary]) -> Result<String, String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedSeparatorFormatter);
    summaries
        .serialize(&mut serializer)
        .map_err(|err| err.to_string())?;
    String::from_utf8(buf).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_member_count_accepts_float_text_and_numbers() {
        assert_eq!(parse_member_count(&EnumCellValue::text("3.0")), Ok(3));
        assert_eq!(parse_member_count(&EnumCellValue::text(" 4 ")), Ok(4));
        assert_eq!(parse_member_count(&EnumCellValue::Number(2.9)), Ok(2));
        assert_eq!(parse_member_count(&EnumCellValue::Number(-1.5)), Ok(-1));
        assert_eq!(parse_member_count(&EnumCellValue::None), Ok(0));
        assert_eq!(parse_member_count(&EnumCellValue::text("  ")), Ok(0));
    }

    #[test]
    fn test_parse_member_count_reports_offending_text() {
        assert_eq!(
            parse_member_count(&EnumCellValue::text("three")),
            Err("three".to_string())
        );
        assert_eq!(
            parse_member_count(&EnumCellValue::text("nan")),
            Err("nan".to_string())
        );
        assert!(parse_member_count(&EnumCellValue::Number(f64::INFINITY)).is_err());
        assert!(parse_member_count(&EnumCellValue::DateTime(45_000.0)).is_err());
    }

    #[test]
    fn test_effective_count_is_at_least_one() {
        assert_eq!(derive_effective_count(0), 1);
        assert_eq!(derive_effective_count(-3), 1);
        assert_eq!(derive_effective_count(7), 7);
    }

    #[test]
    fn test_contact_prefers_numbered_columns_over_base_column() {
        let mut row = vec![EnumCellValue::None; 70];
        row[61] = EnumCellValue::text("A");
        row[62] = EnumCellValue::text("B");
        assert_eq!(
            resolve_contact_number(&row, &[62, 64, 66, 61]),
            EnumCellValue::text("B")
        );

        row[62] = EnumCellValue::text("   ");
        row[66] = EnumCellValue::Number(771_234_567.0);
        assert_eq!(
            resolve_contact_number(&row, &[62, 64, 66, 61]),
            EnumCellValue::Number(771_234_567.0)
        );

        assert_eq!(
            resolve_contact_number(&[], &[62, 64, 66, 61]),
            EnumCellValue::None
        );
    }

    #[test]
    fn test_member_summaries_use_spaced_separators() {
        let l_summaries = vec![
            SpecMemberSummary {
                name: "සමන්".to_string(),
                age: "52".to_string(),
            },
            SpecMemberSummary {
                name: "Say \"hi\"".to_string(),
                age: String::new(),
            },
        ];
        assert_eq!(
            encode_member_summaries(&l_summaries),
            Ok(r#"[{"name": "සමන්", "age": "52"}, {"name": "Say \"hi\"", "age": ""}]"#.to_string())
        );
        assert_eq!(encode_member_summaries(&[]), Ok("[]".to_string()));
    }

    #[test]
    fn test_normalize_row_width_pads_and_truncates() {
        let mut row = vec![EnumCellValue::Number(1.0)];
        assert_eq!(normalize_row_width(&mut row, 3), 0);
        assert_eq!(row.len(), 3);
        assert_eq!(row[2], EnumCellValue::None);

        let mut row = vec![EnumCellValue::Number(1.0); 5];
        assert_eq!(normalize_row_width(&mut row, 2), 3);
        assert_eq!(row.len(), 2);
    }
}
