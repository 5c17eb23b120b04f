//! Verify command: sanity checks over a reformatted workbook.

use std::process::ExitCode;

use anyhow::{Context, Result};
use surveykit_io_xlsx::{SpecXlsxReadOptions, read_xlsx_table};
use surveykit_reshape::{SpecVerifyOptions, verify_reshaped_table};
use tracing::{info, warn};

use crate::cli_args::VerifyArgs;

/// Run the verify command.
///
/// Exits with failure when the boundary header check fails or any household
/// group has the wrong number of rows.
pub(crate) fn run(args: &VerifyArgs) -> Result<ExitCode> {
    let table = read_xlsx_table(&args.input, &SpecXlsxReadOptions::default())
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let options = SpecVerifyOptions {
        rule_duplicate: args.policy,
        header_sentinel: args.sentinel.clone(),
        ..Default::default()
    };
    let report = verify_reshaped_table(&table, &options)?;

    let check = &report.header_check;
    info!("Last member column header: {}", check.header_block_last);
    info!("Suffix start header      : {}", check.header_suffix_first);
    if check.if_pass {
        info!("{} columns appear removed.", args.sentinel);
    } else {
        warn!("{} columns still present around boundary.", args.sentinel);
    }

    for group in &report.groups {
        if group.if_match {
            info!("{group}");
        } else {
            warn!("{group}");
        }
    }
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
    info!("{report}");

    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use surveykit_io_xlsx::{EnumCellValue, SpecCellTable, write_xlsx_table};
    use surveykit_reshape::{EnumDuplicatePolicy, VerifyError};
    use tempfile::tempdir;

    fn derive_long_table(n_rows_second: usize) -> SpecCellTable {
        let header: Vec<String> = (0..90).map(|n_col| format!("H{n_col}")).collect();
        let mut rows = Vec::new();
        for (c_date, n_members, n_rows) in [("d1", 2.0, 2), ("d2", 3.0, n_rows_second)] {
            for n_idx in 0..n_rows {
                let mut row = vec![EnumCellValue::None; 90];
                if n_idx == 0 {
                    row[0] = c_date.into();
                    row[69] = n_members.into();
                }
                row[70] = format!("M{n_idx}").into();
                rows.push(row);
            }
        }
        SpecCellTable::from_text_header(&header, rows)
    }

    fn derive_args(input: PathBuf) -> VerifyArgs {
        VerifyArgs {
            input,
            policy: EnumDuplicatePolicy::FirstOnly,
            sentinel: "GN_ID".to_string(),
        }
    }

    #[test]
    fn test_verify_passes_on_well_formed_groups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        write_xlsx_table(path.clone(), &derive_long_table(3), "Reformatted Data").unwrap();

        assert_eq!(run(&derive_args(path)).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_verify_fails_on_short_group() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        write_xlsx_table(path.clone(), &derive_long_table(2), "Reformatted Data").unwrap();

        assert_eq!(run(&derive_args(path)).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_verify_rejects_full_duplicate_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        write_xlsx_table(path.clone(), &derive_long_table(3), "Reformatted Data").unwrap();

        let args = VerifyArgs {
            policy: EnumDuplicatePolicy::All,
            ..derive_args(path)
        };
        let err = run(&args).unwrap_err();
        assert_eq!(
            err.downcast_ref::<VerifyError>(),
            Some(&VerifyError::UnsupportedPolicy(EnumDuplicatePolicy::All))
        );
    }
}
