//! CLI argument definitions for the `surveykit` binary.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types live here,
//! keeping `main.rs` focused on dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use surveykit_reshape::EnumDuplicatePolicy;
use surveykit_reshape::conf::{
    C_FILE_INPUT_DEFAULT, C_FILE_MISSING_DEFAULT, C_FILE_OUTPUT_DEFAULT, C_HEADER_SENTINEL_DEFAULT,
};

/// surveykit - household survey reshaping tools
#[derive(Parser)]
#[command(name = "surveykit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Expand one-row-per-household data into one row per member
    Reformat(ReformatArgs),

    /// Check a reformatted workbook for boundary and group-size problems
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ReformatArgs {
    /// Wide-format survey workbook
    #[arg(short, long, default_value = C_FILE_INPUT_DEFAULT)]
    pub input: PathBuf,

    /// Reformatted workbook to write
    #[arg(short, long, default_value = C_FILE_OUTPUT_DEFAULT)]
    pub output: PathBuf,

    /// Missing-data report workbook (written only when members are missing data)
    #[arg(long, default_value = C_FILE_MISSING_DEFAULT)]
    pub missing_output: PathBuf,

    /// Worksheet to read (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Household column replication on member rows (all, first_only)
    #[arg(long, default_value = "all")]
    pub policy: EnumDuplicatePolicy,

    /// Skip the missing-data report
    #[arg(long)]
    pub no_missing_report: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct VerifyArgs {
    /// Reformatted workbook to check
    #[arg(short, long, default_value = C_FILE_OUTPUT_DEFAULT)]
    pub input: PathBuf,

    /// Duplicate policy the workbook was produced with
    #[arg(long, default_value = "first_only")]
    pub policy: EnumDuplicatePolicy,

    /// Text that must not appear in the block/suffix boundary headers
    #[arg(long, default_value = C_HEADER_SENTINEL_DEFAULT)]
    pub sentinel: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformat_defaults_match_survey_files() {
        let cli = Cli::try_parse_from(["surveykit", "reformat"]).unwrap();
        let Commands::Reformat(args) = cli.command else {
            panic!("expected reformat");
        };
        assert_eq!(args.input, PathBuf::from("DCF 1 CALLS- Savindi.xlsx"));
        assert_eq!(args.output, PathBuf::from("reformatted_data.xlsx"));
        assert_eq!(args.missing_output, PathBuf::from("missing_data.xlsx"));
        assert_eq!(args.policy, EnumDuplicatePolicy::All);
        assert!(!args.no_missing_report);
        assert_eq!(args.sheet, None);
    }

    #[test]
    fn test_verify_defaults_to_first_only() {
        let cli = Cli::try_parse_from(["surveykit", "verify", "--sentinel", "XX"]).unwrap();
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.policy, EnumDuplicatePolicy::FirstOnly);
        assert_eq!(args.sentinel, "XX");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(Cli::try_parse_from(["surveykit", "reformat", "--policy", "some"]).is_err());
    }
}
