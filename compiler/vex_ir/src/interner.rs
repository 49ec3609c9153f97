//! String interner for identifier storage.
//!
//! Interning is O(1) amortized and lookups never allocate. The table is
//! behind a `RwLock` so that the checker can resolve names from worker
//! threads while a driver is still interning.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// The table exceeded `u32::MAX` entries.
    Overflow { count: usize },
    /// A serialized table whose entry 0 is not the empty string.
    MissingEmpty,
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
            InternError::MissingEmpty => {
                f.write_str("name table does not start with the empty string")
            }
        }
    }
}

impl std::error::Error for InternError {}

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        InternTable {
            map,
            strings: vec![empty],
        }
    }
}

/// Thread-safe string interner.
///
/// Strings are leaked to obtain `'static` references; an interner lives
/// for the whole checker run so nothing is ever reclaimed early.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(InternTable::with_empty()),
        }
    }

    /// Rebuild an interner from a serialized string table.
    ///
    /// Entry `i` of `strings` becomes `Name::from_raw(i)`, so names stored
    /// alongside the table stay valid. Entry 0 must be the empty string,
    /// as in every table produced by [`to_strings`](Self::to_strings); an
    /// empty table is treated as `[""]`.
    pub fn from_strings<I, S>(strings: I) -> Result<Self, InternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let interner = Self::new();
        {
            let mut table = interner.table.write();
            let mut strings = strings.into_iter();
            if let Some(first) = strings.next() {
                if !first.as_ref().is_empty() {
                    return Err(InternError::MissingEmpty);
                }
            }
            for s in strings {
                let s = s.as_ref();
                let index = u32::try_from(table.strings.len()).map_err(|_| {
                    InternError::Overflow {
                        count: table.strings.len(),
                    }
                })?;
                let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
                table.strings.push(leaked);
                table.map.entry(leaked).or_insert(index);
            }
        }
        Ok(interner)
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned
        if let Some(&index) = self.table.read().map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let mut table = self.table.write();
        if let Some(&index) = table.map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let index = u32::try_from(table.strings.len()).map_err(|_| InternError::Overflow {
            count: table.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Ok(Name::from_raw(index))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32::MAX` strings.
    /// Use `try_intern` for fallible interning.
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    ///
    /// Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Snapshot the table in index order, for serialization.
    pub fn to_strings(&self) -> Vec<String> {
        self.table
            .read()
            .strings
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if the interner only holds the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned string names.
///
/// Checker and diagnostic code accept any `StringLookup` so they do not
/// depend on how the table was produced.
pub trait StringLookup {
    /// Look up the string for an interned name.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}
