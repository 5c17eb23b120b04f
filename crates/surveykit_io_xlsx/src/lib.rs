//! `surveykit_io_xlsx` v1:
//! Spreadsheet boundary of the household reshaping workspace.
//!
//! - `conf`   : constants and default presets
//! - `spec`   : cell/table models, options and errors
//! - `util`   : pure helper functions
//! - `reader` : calamine-backed sheet loader
//! - `writer` : rust_xlsxwriter-backed writer kernel
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use reader::{derive_table_from_range, read_xlsx_table};
pub use spec::{
    EnumCellValue, SpecCellFormat, SpecCellTable, SpecColumnWidthPolicy, SpecSheetSlice,
    SpecXlsxReadOptions, SpecXlsxReport, SpecXlsxValuePolicy, SpecXlsxWriteOptions,
    XlsxReadError,
};
pub use util::{derive_cell_text, plan_sheet_slices, sanitize_sheet_name};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter, write_xlsx_table};
