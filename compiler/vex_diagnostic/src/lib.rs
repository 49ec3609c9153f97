//! Diagnostic system for the Vex safety checker.
//!
//! Every rejection the checker makes is a [`Diagnostic`]:
//! - Error codes for searchability (`vexc explain E2001`)
//! - Clear messages naming the binding involved
//! - Primary span (where it went wrong) and secondary spans (why)
//! - Help hints (how to fix)
//!
//! Codes encode the checker phase in their first digit, so consumers can
//! tell which phase rejected the program without parsing messages.
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted.
//!
//! ```text
//! let guarantee = ErrorGuaranteed::from_error_count(sink.error_count());
//! fn check() -> Result<AnnotatedModule, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
mod guarantee;
pub mod sink;
pub mod span_utils;

pub use diagnostic::{Applicability, Diagnostic, Label, Severity, Suggestion};
pub use error_code::{ErrorCode, ErrorKind, Phase};
pub use errors::ErrorDocs;
pub use guarantee::ErrorGuaranteed;
pub use sink::{BatchKey, DiagnosticConfig, DiagnosticSink};
