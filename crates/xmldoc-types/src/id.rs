use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a document by the metadata store.
///
/// IDs start at 1 and grow monotonically. A store never hands out the same
/// ID twice, even after its records are purged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    /// The first ID a fresh store assigns.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw ID value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The ID that follows this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
