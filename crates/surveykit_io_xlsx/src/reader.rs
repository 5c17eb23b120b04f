//! XLSX reader that loads one worksheet into a [`SpecCellTable`].

use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};

use crate::spec::{EnumCellValue, SpecCellTable, SpecXlsxReadOptions, XlsxReadError};

/// Load one worksheet of an `.xlsx` workbook.
///
/// The used range is re-anchored at `A1`, so cell `(r, c)` of the returned
/// grid is sheet row `r + 1`, column `c + 1` even when the sheet starts with
/// empty rows or columns. Sheet row 1 becomes the header.
pub fn read_xlsx_table<P: AsRef<Path>>(
    path_file_in: P,
    options: &SpecXlsxReadOptions,
) -> Result<SpecCellTable, XlsxReadError> {
    let path_file_in = path_file_in.as_ref();
    let mut workbook: Xlsx<_> =
        open_workbook(path_file_in).map_err(|err: calamine::XlsxError| XlsxReadError::Open {
            path: path_file_in.to_path_buf(),
            message: err.to_string(),
        })?;

    let l_sheet_names = workbook.sheet_names();
    let c_sheet_name = match &options.sheet_name {
        Some(name) => l_sheet_names
            .iter()
            .find(|c_name| *c_name == name)
            .cloned()
            .ok_or_else(|| XlsxReadError::SheetNotFound(name.clone()))?,
        None => l_sheet_names
            .first()
            .cloned()
            .ok_or_else(|| XlsxReadError::SheetNotFound("<first>".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&c_sheet_name)
        .map_err(|err| XlsxReadError::Sheet {
            sheet: c_sheet_name.clone(),
            message: err.to_string(),
        })?;

    Ok(derive_table_from_range(&range))
}

/// Convert a calamine range into an `A1`-anchored table.
pub fn derive_table_from_range(range: &Range<Data>) -> SpecCellTable {
    let Some((n_row_start, n_col_start)) = range.start() else {
        return SpecCellTable::default();
    };
    if range.is_empty() {
        return SpecCellTable::default();
    }

    let n_col_offset = n_col_start as usize;
    let n_width = n_col_offset + range.width();

    let mut l_grid: Vec<Vec<EnumCellValue>> =
        vec![vec![EnumCellValue::None; n_width]; n_row_start as usize];
    for row in range.rows() {
        let mut l_row = Vec::with_capacity(n_width);
        l_row.resize(n_col_offset, EnumCellValue::None);
        l_row.extend(row.iter().map(derive_cell_value_from_data));
        l_grid.push(l_row);
    }

    let mut it_rows = l_grid.into_iter();
    let header = it_rows.next().unwrap_or_default();
    SpecCellTable::new(header, it_rows.collect())
}

/// Map one calamine cell into the shared cell model.
pub fn derive_cell_value_from_data(value: &Data) -> EnumCellValue {
    match value {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::String(if *val { "True" } else { "False" }.to_string()),
        Data::DateTime(val) => EnumCellValue::DateTime(val.as_f64()),
        Data::DateTimeIso(val) | Data::DurationIso(val) => EnumCellValue::String(val.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derive_table_reanchors_sparse_range_at_a1() {
        let range = Range::from_sparse(vec![
            Cell::new((1, 1), Data::String("hdr".to_string())),
            Cell::new((2, 2), Data::Int(3)),
        ]);

        let table = derive_table_from_range(&range);

        assert_eq!(table.header, vec![EnumCellValue::None; 3]);
        assert_eq!(
            table.rows,
            vec![
                vec![
                    EnumCellValue::None,
                    EnumCellValue::text("hdr"),
                    EnumCellValue::None
                ],
                vec![
                    EnumCellValue::None,
                    EnumCellValue::None,
                    EnumCellValue::Number(3.0)
                ],
            ]
        );
    }

    #[test]
    fn test_derive_table_from_empty_range_is_empty() {
        let range: Range<Data> = Range::empty();
        assert!(derive_table_from_range(&range).is_empty());
    }

    #[test]
    fn test_derive_cell_value_maps_bool_and_errors() {
        assert_eq!(
            derive_cell_value_from_data(&Data::Bool(true)),
            EnumCellValue::text("True")
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::Error(calamine::CellErrorType::Div0)),
            EnumCellValue::None
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::Float(2.5)),
            EnumCellValue::Number(2.5)
        );
    }
}
