//! Customer domain entity.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::RowVersion;

/// Customer managed by the user service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Customer {
    pub id: i32,
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    #[validate(length(min = 1, max = 128))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub row_version: RowVersion,
}

impl Customer {
    /// Create a new, not yet persisted customer
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            row_version: RowVersion::empty(),
        }
    }

    /// Display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
