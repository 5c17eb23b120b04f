//! XLSX writer kernel for in-memory cell tables.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, derive_default_xlsx_formats};
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecCellTable, SpecColumnWidthPolicy, SpecSheetSlice,
    SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{convert_cell_value, derive_cell_text, plan_sheet_slices, sanitize_sheet_name};

const N_ROWS_HEADER: usize = 1;

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Columns frozen at the left edge.
    pub col_freeze: usize,
    /// Rows frozen at the top; the header row when `None`.
    pub row_freeze: Option<usize>,
    /// Override of [`SpecXlsxWriteOptions::keep_missing_values`].
    pub if_keep_missing_values: Option<bool>,
    /// Column width policy.
    pub policy_width: SpecColumnWidthPolicy,
}

struct SpecSheetFormats {
    header: Format,
    text: Format,
    datetime: Format,
}

/// Workbook writer that buffers sheets until [`Self::close`].
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_datetime: SpecCellFormat,
    fmt_header: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_used: BTreeSet<String>,
    l_sheet_reports: Vec<SpecXlsxReport>,
    if_saved: bool,
}

impl XlsxWriter {
    pub fn new(
        path_file_out: PathBuf,
        fmt_text: SpecCellFormat,
        fmt_datetime: SpecCellFormat,
        fmt_header: SpecCellFormat,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_text,
            fmt_datetime,
            fmt_header,
            write_options,
            set_sheet_names_used: BTreeSet::new(),
            l_sheet_reports: Vec::new(),
            if_saved: false,
        }
    }

    /// Writer using the presets of [`derive_default_xlsx_formats`].
    pub fn with_defaults(path_file_out: PathBuf) -> Self {
        let dict_fmt = derive_default_xlsx_formats();
        let get_fmt = |key: EnumFmtKey| dict_fmt.get(key.as_str()).cloned().unwrap_or_default();
        Self::new(
            path_file_out,
            get_fmt(EnumFmtKey::Text),
            get_fmt(EnumFmtKey::DateTime),
            get_fmt(EnumFmtKey::Header),
            SpecXlsxWriteOptions::default(),
        )
    }

    /// One report per `write_sheet` call, in call order.
    pub fn reports(&self) -> &[SpecXlsxReport] {
        &self.l_sheet_reports
    }

    /// Save the workbook. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_saved {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_saved = true;
        Ok(())
    }

    /// Add `table` as one sheet, or several when it exceeds Excel's limits.
    ///
    /// Body cells are written against the header width: short rows are padded
    /// with blanks, extra cells are dropped with a warning in the report.
    pub fn write_sheet(
        &mut self,
        table: &SpecCellTable,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        if self.if_saved {
            return Err(format!(
                "Cannot add sheet {sheet_name:?}: workbook already saved."
            ));
        }
        options.policy_width.validate()?;

        let if_keep_missing_values = options
            .if_keep_missing_values
            .unwrap_or(self.write_options.keep_missing_values);
        let value_policy = self.write_options.value_policy.clone();
        let formats = self.derive_sheet_formats();

        let mut report = SpecXlsxReport::default();
        let n_rows_overwide = table
            .rows
            .iter()
            .filter(|row| row.len() > table.width())
            .count();
        if n_rows_overwide > 0 {
            report.warn(format!(
                "{n_rows_overwide} rows wider than header ({} columns); extra cells dropped.",
                table.width()
            ));
        }

        let l_slices = plan_sheet_slices(
            table.height(),
            table.width(),
            N_ROWS_HEADER,
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        )?;

        for slice in l_slices {
            let sheet_name_unique = self.claim_sheet_name(&slice.sheet_name);
            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&sheet_name_unique)
                .map_err(derive_xlsx_error_text)?;

            let l_header = &table.header[slice.col_start_inclusive..slice.col_end_exclusive];
            let mut l_len_by_col = write_header_row(worksheet, l_header, &formats.header)?;
            worksheet
                .set_freeze_panes(
                    cast_row_num(options.row_freeze.unwrap_or(N_ROWS_HEADER))?,
                    cast_col_num(options.col_freeze)?,
                )
                .map_err(derive_xlsx_error_text)?;

            let l_rows = &table.rows[slice.row_start_inclusive..slice.row_end_exclusive];
            for (n_row_local, row) in l_rows.iter().enumerate() {
                let if_measure = n_row_local < options.policy_width.height_body_sampled;
                for (n_idx_col, n_len_col) in l_len_by_col.iter_mut().enumerate() {
                    let value_raw = row
                        .get(slice.col_start_inclusive + n_idx_col)
                        .unwrap_or(&EnumCellValue::None);
                    let value =
                        convert_cell_value(value_raw, if_keep_missing_values, &value_policy);
                    if if_measure {
                        *n_len_col = usize::max(*n_len_col, estimate_width_len(&value));
                    }
                    let format = match value {
                        EnumCellValue::DateTime(_) => &formats.datetime,
                        _ => &formats.text,
                    };
                    write_cell_with_format(
                        worksheet,
                        N_ROWS_HEADER + n_row_local,
                        n_idx_col,
                        &value,
                        format,
                    )?;
                }
            }

            if options.policy_width.if_autofit {
                for (n_idx_col, n_len_col) in l_len_by_col.iter().enumerate() {
                    worksheet
                        .set_column_width(
                            cast_col_num(n_idx_col)?,
                            options.policy_width.derive_width(*n_len_col),
                        )
                        .map_err(derive_xlsx_error_text)?;
                }
            }

            report.sheets.push(SpecSheetSlice {
                sheet_name: sheet_name_unique,
                ..slice
            });
        }

        self.l_sheet_reports.push(report);
        Ok(())
    }

    fn derive_sheet_formats(&self) -> SpecSheetFormats {
        let fmt_patch = &self.write_options.base_format_patch;
        SpecSheetFormats {
            header: derive_rust_xlsx_format(&self.fmt_header),
            text: derive_rust_xlsx_format(&self.fmt_text.merge(fmt_patch)),
            datetime: derive_rust_xlsx_format(&self.fmt_datetime.merge(fmt_patch)),
        }
    }

    /// Reserve `name`, or `name__2`, `name__3`, ... when taken.
    ///
    /// Excel compares sheet names case-insensitively.
    fn claim_sheet_name(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        let mut n_idx = 1usize;
        while self.set_sheet_names_used.contains(&candidate.to_lowercase()) {
            n_idx += 1;
            let c_suffix = format!("__{n_idx}");
            let n_len_base = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
            candidate = name.chars().take(n_len_base).collect::<String>() + &c_suffix;
        }
        self.set_sheet_names_used.insert(candidate.to_lowercase());
        candidate
    }
}

/// Write `table` to a fresh workbook at `path_file_out` with default presets.
///
/// Returns the report of the single sheet call.
pub fn write_xlsx_table(
    path_file_out: PathBuf,
    table: &SpecCellTable,
    sheet_name: &str,
) -> Result<SpecXlsxReport, String> {
    let mut writer = XlsxWriter::with_defaults(path_file_out);
    writer.write_sheet(table, sheet_name, &SpecXlsxSheetWriteOptions::default())?;
    writer.close()?;
    Ok(writer.reports().last().cloned().unwrap_or_default())
}

/// Approximate display width of a cell already converted for writing.
///
/// Non-ASCII characters (Sinhala, Tamil) count as 1.6 columns.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    let c_text = derive_cell_text(value);
    let n_ascii = c_text.chars().filter(char::is_ascii).count();
    let n_non_ascii = c_text.chars().count() - n_ascii;
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Header cells; returns measured widths per column.
fn write_header_row(
    worksheet: &mut Worksheet,
    l_header: &[EnumCellValue],
    format: &Format,
) -> Result<Vec<usize>, String> {
    let mut l_len_by_col = Vec::with_capacity(l_header.len());
    for (n_idx_col, value) in l_header.iter().enumerate() {
        let value_text = match value {
            EnumCellValue::None => EnumCellValue::None,
            _ => EnumCellValue::String(derive_cell_text(value)),
        };
        l_len_by_col.push(estimate_width_len(&value_text));
        write_cell_with_format(worksheet, 0, n_idx_col, &value_text, format)?;
    }
    Ok(l_len_by_col)
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: usize,
    n_col: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let (n_row, n_col) = (cast_row_num(n_row)?, cast_col_num(n_col)?);
    match value {
        EnumCellValue::None => worksheet.write_blank(n_row, n_col, format),
        EnumCellValue::String(s) => worksheet.write_string_with_format(n_row, n_col, s, format),
        EnumCellValue::Number(n) | EnumCellValue::DateTime(n) => {
            worksheet.write_number_with_format(n_row, n_col, *n, format)
        }
    }
    .map(|_| ())
    .map_err(derive_xlsx_error_text)
}

fn derive_rust_xlsx_format(fmt: &SpecCellFormat) -> Format {
    let mut format = Format::new();
    if let Some(name) = &fmt.font_name {
        format = format.set_font_name(name.as_str());
    }
    if let Some(size) = fmt.font_size {
        format = format.set_font_size(size as f64);
    }
    if fmt.bold == Some(true) {
        format = format.set_bold();
    }
    for align in [&fmt.align, &fmt.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(align) {
            format = format.set_align(align);
        }
    }
    if let Some(code) = &fmt.num_format {
        format = format.set_num_format(code.as_str());
    }
    if let Some(border) = fmt.border {
        format = format.set_border(match border {
            1 => FormatBorder::Thin,
            2 => FormatBorder::Medium,
            5 => FormatBorder::Thick,
            _ => FormatBorder::None,
        });
    }
    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
