//! Shared XLSX specification models.

use std::fmt;
use std::path::PathBuf;

use crate::util::derive_cell_text;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format preset applied by the writer.
///
/// Only the properties the survey workbooks use are modeled; unset fields
/// leave the rust_xlsxwriter default in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides (1 thin, 2 medium, 5 thick).
    pub border: Option<i64>,
    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Overlay `other` onto `self`; set fields of `other` win.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        let pick = |a: &Option<String>, b: &Option<String>| a.clone().or_else(|| b.clone());
        SpecCellFormat {
            font_name: pick(&other.font_name, &self.font_name),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: pick(&other.align, &self.align),
            valign: pick(&other.valign, &self.valign),
            border: other.border.or(self.border),
            num_format: pick(&other.num_format, &self.num_format),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// Normalized cell value shared by reader, transforms and writer.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Excel date/time serial (days since 1899-12-30).
    DateTime(f64),
}

impl EnumCellValue {
    /// `true` for missing cells and whitespace-only text.
    ///
    /// Numbers and dates are never blank, including `0`.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.trim().is_empty(),
            Self::Number(_) | Self::DateTime(_) => false,
        }
    }

    /// Display text of the cell; blank cells render as `""`.
    pub fn to_text(&self) -> String {
        derive_cell_text(self)
    }

    /// Convenience constructor for text cells.
    pub fn text(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            _ => write!(f, "{}", self.to_text()),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// In-memory sheet: one header row plus data rows.
///
/// Rows are not required to share the header width.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellTable {
    /// Header cells (sheet row 1).
    pub header: Vec<EnumCellValue>,
    /// Data rows (sheet rows 2..).
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecCellTable {
    /// Create a table from header and data rows.
    pub fn new(header: Vec<EnumCellValue>, rows: Vec<Vec<EnumCellValue>>) -> Self {
        Self { header, rows }
    }

    /// Build a table whose header is plain text.
    pub fn from_text_header<S: AsRef<str>>(header: &[S], rows: Vec<Vec<EnumCellValue>>) -> Self {
        Self {
            header: header
                .iter()
                .map(|c_name| EnumCellValue::text(c_name.as_ref()))
                .collect(),
            rows,
        }
    }

    /// `true` when the sheet had no rows at all.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// Number of header cells.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows (header excluded).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row across header and data.
    pub fn width_max(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .fold(self.header.len(), usize::max)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Value conversion policy for missing/NaN/Inf values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value when keep-missing is enabled.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Column width policy for one sheet.
///
/// Widths are measured from the header and, optionally, the first
/// `height_body_sampled` body rows, then padded and clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnWidthPolicy {
    /// Size columns from their content; leave Excel defaults when `false`.
    pub if_autofit: bool,
    /// Body rows measured in addition to the header.
    pub height_body_sampled: usize,
    /// Minimum final width.
    pub width_min: usize,
    /// Maximum final width (Excel caps at 255).
    pub width_max: usize,
    /// Padding added to the measured width.
    pub width_padding: usize,
}

impl Default for SpecColumnWidthPolicy {
    fn default() -> Self {
        Self {
            if_autofit: true,
            height_body_sampled: 0,
            width_min: 8,
            width_max: 60,
            width_padding: 2,
        }
    }
}

impl SpecColumnWidthPolicy {
    /// Reject bounds that cannot produce a width.
    pub fn validate(&self) -> Result<(), String> {
        if self.width_min == 0 {
            return Err("width_min must be >= 1.".to_string());
        }
        if self.width_max < self.width_min {
            return Err(format!(
                "width_max ({}) must be >= width_min ({}).",
                self.width_max, self.width_min
            ));
        }
        Ok(())
    }

    /// Final width for a measured text length.
    pub fn derive_width(&self, n_len_measured: usize) -> f64 {
        let n_max = usize::min(255, self.width_max);
        (n_len_measured + self.width_padding).clamp(self.width_min, n_max) as f64
    }
}

/// Writer-wide options controlling value conversion and formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Value conversion policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Keep missing/NaN/Inf as text instead of blank.
    pub keep_missing_values: bool,
    /// Base patch merged into all body formats.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            keep_missing_values: false,
            base_format_patch: SpecCellFormat {
                border: Some(0),
                ..Default::default()
            },
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReadOptions

/// Reader options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReadOptions {
    /// Sheet to read; first worksheet when `None`.
    pub sheet_name: Option<String>,
}

/// Failures while loading a workbook into a [`SpecCellTable`].
#[derive(Debug, thiserror::Error)]
pub enum XlsxReadError {
    /// Workbook could not be opened or parsed.
    #[error("Failed to load workbook {}: {message}", path.display())]
    Open {
        /// Workbook path.
        path: PathBuf,
        /// Underlying reader error text.
        message: String,
    },
    /// Workbook has no worksheet (or none with the requested name).
    #[error("Sheet not found: {0:?}")]
    SheetNotFound(String),
    /// Worksheet cells could not be decoded.
    #[error("Failed to read sheet {sheet:?}: {message}")]
    Sheet {
        /// Sheet name.
        sheet: String,
        /// Underlying reader error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Concrete sheet part emitted to workbook (after Excel-limit slicing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
    /// Inclusive source column start.
    pub col_start_inclusive: usize,
    /// Exclusive source column end.
    pub col_end_exclusive: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet slices produced by the write call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of data rows written across all slices.
    pub fn rows_written(&self) -> usize {
        self.sheets
            .iter()
            .filter(|sheet| sheet.col_start_inclusive == 0)
            .map(|sheet| sheet.row_end_exclusive - sheet.row_start_inclusive)
            .sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
