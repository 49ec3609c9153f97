//! Command handlers for the Vex checker CLI.
//!
//! Each submodule implements one CLI command. Handlers return
//! [`DriverError`](crate::DriverError) for failures of the driver itself;
//! rejections of the checked program are rendered diagnostics, summarized in
//! [`CheckSummary`].

mod check;
mod explain;

pub use check::{
    check_file, check_input, write_annotations, CheckCommand, CheckOptions, CheckSummary,
    OutputFormat,
};
pub use explain::{explain_error, explanation};
