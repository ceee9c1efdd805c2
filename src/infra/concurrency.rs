//! Optimistic concurrency conflict resolution.
//!
//! A conflict is a tracked update or delete whose row no longer carries the
//! row version the caller read. The policy decides which side survives.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::repositories::Record;
use super::unit_of_work::{ChangeState, Entry};
use crate::domain::RowVersion;
use crate::errors::AppResult;

/// Which side wins when a save hits a concurrency conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Keep the stored row, drop the conflicting change and refresh the caller's copy
    DatabaseWins,
    /// Overwrite the stored row with the caller's values
    #[default]
    ClientWins,
}

/// Outcome of resolving one conflicting change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Apply the change again against the refreshed row version
    Retry,
    /// Drop the change from the pending set
    Discard,
    /// The policy cannot resolve this conflict
    Unresolved,
}

/// Resolve a conflict on `entry` under `policy`.
///
/// `original` is the row version the change is filtered on; `ClientWins`
/// moves it to the stored version so the next attempt succeeds.
pub(crate) async fn resolve<T: Record>(
    policy: ConflictPolicy,
    state: ChangeState,
    entry: &Entry<T>,
    original: &mut RowVersion,
    db: &DatabaseConnection,
) -> AppResult<Resolution> {
    let id = entry.id();
    let stored = T::Entity::find()
        .filter(T::id_column().eq(id))
        .one(db)
        .await?
        .map(T::from_model);

    let resolution = match (policy, stored) {
        (ConflictPolicy::DatabaseWins, Some(stored)) => {
            tracing::info!(entity = T::NAME, id, ?state, "Conflict resolved in favor of the stored row");
            entry.replace(stored);
            Resolution::Discard
        }
        (ConflictPolicy::DatabaseWins, None) => {
            tracing::warn!(entity = T::NAME, id, ?state, "Row no longer exists, change discarded");
            Resolution::Discard
        }
        (ConflictPolicy::ClientWins, Some(stored)) => {
            tracing::info!(entity = T::NAME, id, ?state, "Conflict resolved in favor of the client");
            *original = stored.row_version().clone();
            Resolution::Retry
        }
        (ConflictPolicy::ClientWins, None) => {
            tracing::warn!(entity = T::NAME, id, ?state, "Row no longer exists, cannot overwrite");
            Resolution::Unresolved
        }
    };

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_client_wins() {
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::ClientWins);
    }
}
