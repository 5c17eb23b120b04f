#![allow(dead_code)]

use surveykit_io_xlsx::{EnumCellValue, SpecCellTable};
use surveykit_reshape::SpecHouseholdLayout;

/// Columns of the synthetic survey sheet: prefix, 15 blocks, 20 suffix columns.
pub const N_WIDTH_WIDE: usize = 570;

pub fn derive_wide_header() -> Vec<EnumCellValue> {
    let layout = SpecHouseholdLayout::default();
    (0..N_WIDTH_WIDE)
        .map(|n_col| {
            if n_col < layout.prefix_len {
                EnumCellValue::text(format!("P{n_col}"))
            } else if n_col < layout.suffix_start() {
                let n_rel = n_col - layout.prefix_len;
                let (n_block, n_offset) = (n_rel / layout.block_size, n_rel % layout.block_size);
                if n_offset >= layout.keep_block_len {
                    EnumCellValue::text(format!("GN_ID B{n_block}.{n_offset}"))
                } else {
                    EnumCellValue::text(format!("B{n_block}.{n_offset}"))
                }
            } else {
                EnumCellValue::text(format!("S{n_col}"))
            }
        })
        .collect()
}

/// One household row with distinct prefix/suffix values.
pub struct HouseholdRow {
    pub cells: Vec<EnumCellValue>,
}

impl HouseholdRow {
    pub fn new(c_tag: &str) -> Self {
        let layout = SpecHouseholdLayout::default();
        let mut cells = vec![EnumCellValue::None; N_WIDTH_WIDE];
        cells[0] = EnumCellValue::text(format!("{c_tag}-date"));
        cells[layout.col_gn_id] = EnumCellValue::text(format!("{c_tag}-gn"));
        cells[layout.col_household_id] = EnumCellValue::text(format!("{c_tag}-hh"));
        cells[layout.suffix_start()] = EnumCellValue::text(format!("{c_tag}-suffix"));
        Self { cells }
    }

    pub fn member_count(mut self, value: EnumCellValue) -> Self {
        self.cells[SpecHouseholdLayout::default().col_member_count] = value;
        self
    }

    pub fn cell(mut self, n_col: usize, value: EnumCellValue) -> Self {
        self.cells[n_col] = value;
        self
    }

    /// Fill member block `idx_block` with id/name/age and filler columns.
    pub fn member(
        mut self,
        idx_block: usize,
        id: EnumCellValue,
        name: EnumCellValue,
        age: EnumCellValue,
    ) -> Self {
        let layout = SpecHouseholdLayout::default();
        let n_col_start = layout.block_start(idx_block);
        self.cells[n_col_start] = id;
        self.cells[n_col_start + 1] = name;
        self.cells[n_col_start + 2] = age;
        for n_offset in 3..layout.block_size {
            self.cells[n_col_start + n_offset] =
                EnumCellValue::text(format!("b{idx_block}c{n_offset}"));
        }
        self
    }

    pub fn build(self) -> Vec<EnumCellValue> {
        self.cells
    }
}

pub fn derive_wide_table(rows: Vec<Vec<EnumCellValue>>) -> SpecCellTable {
    SpecCellTable::new(derive_wide_header(), rows)
}

pub fn txt(c: &str) -> EnumCellValue {
    EnumCellValue::text(c)
}

pub fn num(n: f64) -> EnumCellValue {
    EnumCellValue::Number(n)
}
