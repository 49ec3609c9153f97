//! Error codes for all checker diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2001`) with the first digit
//! indicating the checker phase. Used for `explain` lookups and documentation.

use std::fmt;

/// Checker phase, in execution order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Phase {
    /// Phase 1: assignment to immutable bindings.
    Mutability,
    /// Phase 2: ownership transfer and initialization.
    Moves,
    /// Phase 3: exclusive-xor-shared reference rules.
    Borrows,
    /// Phase 4: references outliving their referents.
    Lifetimes,
    /// Phase 5: closure capture classification (never rejects).
    Captures,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Mutability,
        Phase::Moves,
        Phase::Borrows,
        Phase::Lifetimes,
        Phase::Captures,
    ];

    /// 1-based phase number, matching the first digit of its error codes.
    pub const fn number(self) -> u8 {
        match self {
            Phase::Mutability => 1,
            Phase::Moves => 2,
            Phase::Borrows => 3,
            Phase::Lifetimes => 4,
            Phase::Captures => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Mutability => "mutability",
            Phase::Moves => "moves",
            Phase::Borrows => "borrows",
            Phase::Lifetimes => "lifetimes",
            Phase::Captures => "captures",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error category, independent of the specific code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    ImmutabilityViolation,
    UseAfterMove,
    PartialInitialization,
    BorrowConflict,
    DanglingReference,
    UseAfterScopeEnd,
    /// An operation that needs an `unsafe` block appears outside one.
    UnsafeOperation,
    /// Checker invariant violated; a bug in the checker, not the program.
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ImmutabilityViolation => "ImmutabilityViolation",
            ErrorKind::UseAfterMove => "UseAfterMove",
            ErrorKind::PartialInitialization => "PartialInitialization",
            ErrorKind::BorrowConflict => "BorrowConflict",
            ErrorKind::DanglingReference => "DanglingReference",
            ErrorKind::UseAfterScopeEnd => "UseAfterScopeEnd",
            ErrorKind::UnsafeOperation => "UnsafeOperation",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes for all checker diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Mutability errors
/// - E2xxx: Move and initialization errors
/// - E3xxx: Borrow errors
/// - E4xxx: Lifetime errors
/// - E9xxx: Internal checker errors
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Mutability Errors (E1xxx)
    /// Assignment to an immutable binding
    E1001,
    /// Assignment to a field or element of an immutable binding
    E1002,

    // Move Errors (E2xxx)
    /// Use of a moved value
    E2001,
    /// Use of a possibly-uninitialized binding
    E2002,

    // Borrow Errors (E3xxx)
    /// Exclusive borrow while another borrow is live
    E3001,
    /// Shared borrow while an exclusive borrow is live
    E3002,
    /// Assignment to a borrowed binding
    E3003,
    /// Move out of a borrowed binding
    E3004,
    /// Assignment through a shared reference
    E3005,
    /// Raw pointer dereference outside an `unsafe` block
    E3006,

    // Lifetime Errors (E4xxx)
    /// Returned reference to a local binding
    E4001,
    /// Reference outlives the block that owns its referent
    E4002,
    /// Use of a binding after its scope ended
    E4003,

    // Internal Errors (E9xxx)
    /// Checker invariant violation
    E9001,
    /// Error limit reached
    E9002,
}

impl ErrorCode {
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// The phase that reports this code. Internal codes belong to no phase.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ErrorCode::E1001 | ErrorCode::E1002 => Some(Phase::Mutability),
            ErrorCode::E2001 | ErrorCode::E2002 => Some(Phase::Moves),
            ErrorCode::E3001
            | ErrorCode::E3002
            | ErrorCode::E3003
            | ErrorCode::E3004
            | ErrorCode::E3005
            | ErrorCode::E3006 => Some(Phase::Borrows),
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 => Some(Phase::Lifetimes),
            ErrorCode::E9001 | ErrorCode::E9002 => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::E1001 | ErrorCode::E1002 => ErrorKind::ImmutabilityViolation,
            ErrorCode::E2001 => ErrorKind::UseAfterMove,
            ErrorCode::E2002 => ErrorKind::PartialInitialization,
            ErrorCode::E3001
            | ErrorCode::E3002
            | ErrorCode::E3003
            | ErrorCode::E3004
            | ErrorCode::E3005 => ErrorKind::BorrowConflict,
            ErrorCode::E3006 => ErrorKind::UnsafeOperation,
            ErrorCode::E4001 | ErrorCode::E4002 => ErrorKind::DanglingReference,
            ErrorCode::E4003 => ErrorKind::UseAfterScopeEnd,
            ErrorCode::E9001 | ErrorCode::E9002 => ErrorKind::Internal,
        }
    }

    /// Check if this is an internal checker error (E9xxx range).
    pub fn is_internal(&self) -> bool {
        self.phase().is_none()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
