//! The `explain` command: display documentation for checker error codes.

use vex_diagnostic::{ErrorCode, ErrorDocs};

use crate::DriverError;

/// Look up the documentation for a code string such as `E2001`.
pub fn explanation(code_str: &str) -> Result<&'static str, DriverError> {
    let code = code_str
        .parse::<ErrorCode>()
        .map_err(|()| DriverError::UnknownCode(code_str.to_owned()))?;
    ErrorDocs::get(code).ok_or_else(|| DriverError::NoDocs(code.to_string()))
}

/// Display detailed documentation for a given error code string.
pub fn explain_error(code_str: &str) {
    match explanation(code_str) {
        Ok(doc) => println!("{doc}"),
        Err(err @ DriverError::UnknownCode(_)) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("Codes have the format EXXXX where X is a digit.");
            eprintln!("Examples: E1001, E2001, E3001, E4001");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("This code is reported by the driver and has no detailed documentation.");
            eprintln!("Please check the error message for guidance.");
            std::process::exit(1);
        }
    }
}
