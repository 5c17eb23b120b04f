//! Survey layout constants and fixed output names.

use surveykit_io_xlsx::N_NROWS_EXCEL_MAX;

/// Household-level columns before the first member block.
pub const N_PREFIX_LEN: usize = 70;
/// Columns per member block.
pub const N_BLOCK_SIZE: usize = 32;
/// Member blocks per household row.
pub const N_NUM_BLOCKS: usize = 15;
/// Leading columns of each block kept in the output.
pub const N_KEEP_BLOCK_LEN: usize = 11;

/// Largest member count expanded; larger counts are treated as unparseable.
///
/// One household may not outgrow a worksheet below its header row.
pub const N_MEMBER_COUNT_MAX: i64 = (N_NROWS_EXCEL_MAX - 1) as i64;

/// Member count column (last prefix column).
pub const N_COL_MEMBER_COUNT: usize = 69;
/// Grama Niladhari division ID column.
pub const N_COL_GN_ID: usize = 5;
/// Household ID column.
pub const N_COL_HOUSEHOLD_ID: usize = 47;
/// Contact number columns in priority order: 10.1, 10.2, 10.3, then 10.
pub const TUP_COLS_CONTACT: [usize; 4] = [62, 64, 66, 61];

/// Block-relative member ID offset.
pub const N_OFFSET_MEMBER_ID: usize = 0;
/// Block-relative member name offset.
pub const N_OFFSET_MEMBER_NAME: usize = 1;
/// Block-relative member age offset.
pub const N_OFFSET_MEMBER_AGE: usize = 2;

/// Header of the missing-data report sheet.
pub const TUP_MISSING_REPORT_HEADER: [&str; 7] = [
    "Grama Niladhari ID",
    "Household ID",
    "Member ID",
    "Name",
    "Age",
    "Contact No",
    "All Members",
];

/// Text expected only in discarded block columns.
pub const C_HEADER_SENTINEL_DEFAULT: &str = "GN_ID";

/// Sheet name of the reformatted workbook.
pub const C_SHEET_REFORMATTED: &str = "Reformatted Data";
/// Sheet name of the missing-data workbook.
pub const C_SHEET_MISSING: &str = "Missing Data";

/// Default input workbook.
pub const C_FILE_INPUT_DEFAULT: &str = "DCF 1 CALLS- Savindi.xlsx";
/// Default reformatted workbook.
pub const C_FILE_OUTPUT_DEFAULT: &str = "reformatted_data.xlsx";
/// Default missing-data workbook.
pub const C_FILE_MISSING_DEFAULT: &str = "missing_data.xlsx";
