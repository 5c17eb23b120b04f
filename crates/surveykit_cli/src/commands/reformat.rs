//! Reformat command: wide survey workbook -> one row per member.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use surveykit_io_xlsx::{
    SpecCellTable, SpecXlsxReadOptions, SpecXlsxReport, read_xlsx_table, write_xlsx_table,
};
use surveykit_reshape::conf::{C_SHEET_MISSING, C_SHEET_REFORMATTED};
use surveykit_reshape::{SpecReshapeOptions, derive_missing_report_table, expand_household_table};
use tracing::{info, warn};

use crate::cli_args::ReformatArgs;

/// Run the reformat command.
///
/// Nothing is written when the input cannot be loaded or has no rows.
pub(crate) fn run(args: &ReformatArgs) -> Result<ExitCode> {
    info!("Loading {}...", args.input.display());
    let table = read_xlsx_table(
        &args.input,
        &SpecXlsxReadOptions {
            sheet_name: args.sheet.clone(),
        },
    )
    .context("Failed to load workbook")?;

    if !table.is_empty() {
        info!("Original Row Count: {}", table.height() + 1);
    }

    let options = SpecReshapeOptions {
        rule_duplicate: args.policy,
        if_report_missing: !args.no_missing_report,
        ..Default::default()
    };
    let output = expand_household_table(&table, &options)?;
    for c_warning in &output.report.warnings {
        warn!("{c_warning}");
    }
    info!("Generated {} new rows.", output.report.cnt_rows_generated);

    let report_write = write_table(args.output.clone(), &output.table, C_SHEET_REFORMATTED)?;
    info!("Saved to {}", args.output.display());
    log_write_warnings(&report_write);

    match derive_missing_report_table(&output.missing_entries) {
        Some(table_missing) => {
            info!(
                "Found {} members with missing data.",
                output.missing_entries.len()
            );
            let report_write =
                write_table(args.missing_output.clone(), &table_missing, C_SHEET_MISSING)?;
            info!(
                "Saved missing data report to {}",
                args.missing_output.display()
            );
            log_write_warnings(&report_write);
        }
        None if options.if_report_missing => info!("No missing data found."),
        None => {}
    }

    info!("{}", output.report);
    Ok(ExitCode::SUCCESS)
}

fn write_table(
    path_file_out: PathBuf,
    table: &SpecCellTable,
    sheet_name: &str,
) -> Result<SpecXlsxReport> {
    let c_path = path_file_out.display().to_string();
    write_xlsx_table(path_file_out, table, sheet_name)
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("Failed to save {c_path}"))
}

fn log_write_warnings(report: &SpecXlsxReport) {
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
}
