//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Day zero of the Excel 1900 date system (serial `0.0`).
pub const TUP_EXCEL_EPOCH_YMD: (i32, u32, u32) = (1899, 12, 30);
/// Text layout for date/time cells rendered as strings.
pub const C_FMT_DATETIME_TEXT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Generic body cell format.
    Text,
    /// Date/time body cell format.
    DateTime,
    /// Header cell format.
    Header,
}

impl EnumFmtKey {
    /// Key used in the preset map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::DateTime => "datetime",
            Self::Header => "header",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Text.as_str().to_string(),
        cfg_base_fmt_spec.clone(),
    );
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            align: Some("left".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::DateTime.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("yyyy-mm-dd hh:mm:ss".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats_cover_every_key() {
        let dict_fmt = derive_default_xlsx_formats();
        for key in [EnumFmtKey::Text, EnumFmtKey::DateTime, EnumFmtKey::Header] {
            assert!(dict_fmt.contains_key(key.as_str()), "missing {key:?}");
        }
        assert_eq!(dict_fmt["header"].bold, Some(true));
        assert_eq!(dict_fmt["text"].num_format, None);
    }
}
