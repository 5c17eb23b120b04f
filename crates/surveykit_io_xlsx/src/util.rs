//! Stateless helper utilities used by the XLSX reader and writer.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::conf::{
    C_FMT_DATETIME_TEXT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_EPOCH_YMD, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecSheetSlice, SpecXlsxReport, SpecXlsxValuePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; return error for finite values.
pub fn convert_nan_inf_to_str(
    x: f64,
    value_policy: &SpecXlsxValuePolicy,
) -> Result<String, String> {
    if x.is_nan() {
        return Ok(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Ok(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    Err("Input is neither NaN nor Inf.".to_string())
}

/// Normalize one cell value for writing according to the value policy.
///
/// Non-finite numbers cannot be stored by Excel; they become policy text when
/// `if_keep_missing_values` is set and blanks otherwise.
pub fn convert_cell_value(
    value: &EnumCellValue,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::None => {
            if if_keep_missing_values {
                EnumCellValue::String(value_policy.missing_value_str.clone())
            } else {
                EnumCellValue::None
            }
        }
        EnumCellValue::Number(n) | EnumCellValue::DateTime(n) if !n.is_finite() => {
            if if_keep_missing_values {
                EnumCellValue::String(
                    convert_nan_inf_to_str(*n, value_policy)
                        .unwrap_or_else(|_| value_policy.nan_str.clone()),
                )
            } else {
                EnumCellValue::None
            }
        }
        _ => value.clone(),
    }
}

/// Render a number the way a spreadsheet user reads it (`30.0` -> `"30"`).
pub fn derive_number_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

/// Convert an Excel 1900-system serial into a calendar timestamp.
pub fn convert_excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let (n_year, n_month, n_day) = TUP_EXCEL_EPOCH_YMD;
    let dt_epoch = NaiveDate::from_ymd_opt(n_year, n_month, n_day)?.and_hms_opt(0, 0, 0)?;
    let n_millis = (serial * 86_400_000.0).round() as i64;
    dt_epoch.checked_add_signed(TimeDelta::try_milliseconds(n_millis)?)
}

/// Text form of a cell; blank cells render as `""`.
pub fn derive_cell_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(s) => s.clone(),
        EnumCellValue::Number(n) => derive_number_text(*n),
        EnumCellValue::DateTime(n) => convert_excel_serial_to_datetime(*n)
            .map(|dt| dt.format(C_FMT_DATETIME_TEXT).to_string())
            .unwrap_or_else(|| derive_number_text(*n)),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Split logical table range into Excel-compliant sheet slices.
pub fn plan_sheet_slices(
    height_df: usize,
    width_df: usize,
    height_header: usize,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    plan_sheet_slices_with_limits(
        height_df,
        width_df,
        height_header,
        sheet_name,
        (N_NROWS_EXCEL_MAX, N_NCOLS_EXCEL_MAX),
        report,
    )
}

/// [`plan_sheet_slices`] with explicit `(rows, cols)` sheet limits.
pub fn plan_sheet_slices_with_limits(
    height_df: usize,
    width_df: usize,
    height_header: usize,
    sheet_name: &str,
    limits: (usize, usize),
    report: &mut SpecXlsxReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    let (n_rows_sheet_max, n_cols_sheet_max) = limits;
    if height_header == 0 {
        return Err("height_header must be >= 1.".to_string());
    }
    if n_cols_sheet_max == 0 {
        return Err("Sheet column limit must be >= 1.".to_string());
    }
    let n_rows_data_max = n_rows_sheet_max
        .checked_sub(height_header)
        .filter(|n_rows| *n_rows > 0)
        .ok_or_else(|| {
            format!("Header too tall: height_header={height_header} exceeds Excel limit.")
        })?;

    let l_col_spans = split_span(width_df, n_cols_sheet_max);
    let l_row_spans = split_span(height_df, n_rows_data_max);
    let n_parts_total = l_col_spans.len() * l_row_spans.len();

    // Parts are numbered row band by row band within each column band.
    let l_sheet_parts: Vec<SpecSheetSlice> = l_col_spans
        .iter()
        .flat_map(|col_span| l_row_spans.iter().map(move |row_span| (*col_span, *row_span)))
        .enumerate()
        .map(|(n_idx_part, ((col_start, col_end), (row_start, row_end)))| SpecSheetSlice {
            sheet_name: if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx_part + 1)
            },
            row_start_inclusive: row_start,
            row_end_exclusive: row_end,
            col_start_inclusive: col_start,
            col_end_exclusive: col_end,
        })
        .collect();

    if n_parts_total > 1 {
        report.warn(format!(
            "Excel limit overflow: split into {n_parts_total} sheets (columns-first, then rows)."
        ));
    }
    Ok(l_sheet_parts)
}

/// `[start, end)` spans of at most `n_step` covering `0..n_total`; one empty span for `0`.
fn split_span(n_total: usize, n_step: usize) -> Vec<(usize, usize)> {
    if n_total == 0 {
        return vec![(0, 0)];
    }
    (0..n_total)
        .step_by(n_step)
        .map(|n_start| (n_start, usize::min(n_total, n_start + n_step)))
        .collect()
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, n_part: usize) -> String {
    let c_suffix = format!("_{n_part}");
    let n_len_base = usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len()));
    base_name.chars().take(n_len_base).collect::<String>() + &c_suffix
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
