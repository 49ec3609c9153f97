//! Arena indices used by the checker.
//!
//! Scope and binding ids are local to one function walk of one phase; they
//! are never reused within that walk and carry no meaning outside it.

macro_rules! checker_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        $vis struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

checker_id! {
    /// Lexical scope in a [`ScopeTree`](crate::ScopeTree).
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct ScopeId;
}

checker_id! {
    /// Binding in a [`BindingTable`](crate::BindingTable).
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct BindingId;
}

checker_id! {
    /// Loan tracked by the borrow validator.
    pub(crate) struct LoanId;
}

impl ScopeId {
    /// The module scope. Always the first scope of a tree.
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn raw(self) -> u32 {
        self.0
    }
}
