//! Stack growth for deep recursion.
//!
//! Every checker phase walks expressions recursively, one frame per level
//! of nesting. A generated module can nest far deeper than the main
//! thread's stack allows, so each recursive entry point goes through
//! [`ensure_sufficient_stack`]:
//!
//! ```text
//! fn eval(&mut self, id: ExprId) -> Result<Loans, CheckError> {
//!     ensure_sufficient_stack(|| self.eval_inner(id))
//! }
//! ```
//!
//! On native targets this switches to a freshly allocated segment when
//! less than [`RED_ZONE`] bytes remain. On wasm it calls through.

/// Remaining stack below which a new segment is allocated.
pub const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated segment.
pub const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f`. Wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
