//! Row version value object - optimistic concurrency token.
//!
//! DDD: Value object - immutable, compared by value.
//! The bytes are opaque: they are generated, stored and compared, never
//! interpreted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ROW_VERSION_LEN;

/// Opaque token that changes on every persisted mutation of a row.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowVersion(Vec<u8>);

impl RowVersion {
    /// Token of a record that was never persisted.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap bytes read from storage.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().as_bytes()[..ROW_VERSION_LEN].to_vec())
    }

    /// Generate a token guaranteed to differ from `previous`.
    pub fn next_after(previous: &RowVersion) -> Self {
        loop {
            let candidate = Self::generate();
            if &candidate != previous {
                return candidate;
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for RowVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RowVersion(")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl From<RowVersion> for Vec<u8> {
    fn from(version: RowVersion) -> Self {
        version.0
    }
}
