//! `surveykit_reshape` v1:
//! Household-survey wide-to-long reshaping kernel.
//!
//! - `conf`   : layout constants and fixed output names
//! - `spec`   : layout/options/output models and errors
//! - `report` : run-time report model
//! - `util`   : row helpers shared by expander and verifier
//! - `expand` : one row per household -> one row per member
//! - `verify` : read-only checks over expanded output

pub mod conf;
pub mod expand;
pub mod report;
pub mod spec;
mod util;
pub mod verify;

pub use expand::{derive_missing_report_table, derive_reshaped_header, expand_household_table};
pub use report::{ReportReshape, ReportReshapeBuilder};
pub use spec::{
    EnumDuplicatePolicy, ReshapeError, SpecGroupCheck, SpecHeaderCheck, SpecHouseholdLayout,
    SpecMemberSummary, SpecMissingMemberEntry, SpecReshapeOptions, SpecReshapeOutput,
    SpecVerifyOptions, SpecVerifyReport, VerifyError,
};
pub use util::parse_member_count;
pub use verify::verify_reshaped_table;
