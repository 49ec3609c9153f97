//! Long-form explanations behind `vexc explain`.
//!
//! One markdown page per user-facing code, embedded at compile time. The
//! page opens with a `# Exxxx` heading, then an example program the checker
//! rejects and the usual ways to fix it.

use crate::ErrorCode;

/// Lookup table for the embedded explanation pages.
pub struct ErrorDocs;

impl ErrorDocs {
    /// The explanation page for `code`. The error-limit notice has none.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        let page = match code {
            ErrorCode::E1001 => include_str!("E1001.md"),
            ErrorCode::E1002 => include_str!("E1002.md"),
            ErrorCode::E2001 => include_str!("E2001.md"),
            ErrorCode::E2002 => include_str!("E2002.md"),
            ErrorCode::E3001 => include_str!("E3001.md"),
            ErrorCode::E3002 => include_str!("E3002.md"),
            ErrorCode::E3003 => include_str!("E3003.md"),
            ErrorCode::E3004 => include_str!("E3004.md"),
            ErrorCode::E3005 => include_str!("E3005.md"),
            ErrorCode::E3006 => include_str!("E3006.md"),
            ErrorCode::E4001 => include_str!("E4001.md"),
            ErrorCode::E4002 => include_str!("E4002.md"),
            ErrorCode::E4003 => include_str!("E4003.md"),
            ErrorCode::E9001 => include_str!("E9001.md"),
            ErrorCode::E9002 => return None,
        };
        Some(page)
    }

    /// Codes with a page, in code order.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        ErrorCode::ALL
            .iter()
            .copied()
            .filter(|code| Self::get(*code).is_some())
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        Self::get(code).is_some()
    }
}
