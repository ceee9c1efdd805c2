//! Unit of Work pattern implementation.
//!
//! SOLID (SRP): Tracks pending changes and commits them atomically.
//! DDD: Coordinates operations across multiple aggregates atomically.
//!
//! Repositories stage inserts, updates and deletes on a shared [`DbContext`].
//! Nothing reaches the database until `save_changes` runs, which applies the
//! whole pending set in one transaction:
//! - updates and deletes are filtered on the row version the caller read
//! - a change that matches no row is a concurrency conflict
//! - identities and new row versions are written back only after commit

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, TransactionTrait,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use validator::Validate;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::concurrency::{self, ConflictPolicy, Resolution};
use super::repositories::Record;
use crate::config::MAX_CONFLICT_RETRIES;
use crate::domain::RowVersion;
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Services save through this trait so they can be tested with
/// `MockUnitOfWork`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Commit every pending change in one transaction.
    ///
    /// Returns the number of rows written. Conflicts fail the whole save.
    async fn save_changes(&self) -> AppResult<u64>;

    /// Commit every pending change, resolving conflicts with `policy`.
    async fn save_changes_with(&self, policy: ConflictPolicy) -> AppResult<u64>;

    /// Whether any change is waiting to be saved
    fn has_changes(&self) -> bool;

    /// Drop every pending change
    fn discard_changes(&self);
}

/// Shared handle to a tracked record.
///
/// Returned by `insert` and `update`; after a successful save it holds the
/// generated identity and the new row version.
pub struct Entry<T> {
    value: Arc<RwLock<T>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: Record> Entry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }

    /// Snapshot of the tracked record
    pub fn current(&self) -> T {
        self.value.read().clone()
    }

    pub fn id(&self) -> i32 {
        self.value.read().id()
    }

    pub fn row_version(&self) -> RowVersion {
        self.value.read().row_version().clone()
    }

    /// Mutate the tracked record in place.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.write());
    }

    /// Replace the tracked record wholesale.
    pub(crate) fn replace(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: fmt::Debug> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&*self.value.read()).finish()
    }
}

/// Kind of pending change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    Added,
    Modified,
    Deleted,
}

pub(crate) enum Applied {
    Rows(u64),
    Conflict,
}

/// Type-erased pending change held by the context.
#[async_trait]
pub(crate) trait PendingChange: Send + Sync {
    fn entity(&self) -> &'static str;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn id(&self) -> i32;

    fn validate(&self) -> AppResult<()>;

    async fn apply(&mut self, txn: &DatabaseTransaction) -> AppResult<Applied>;

    /// Write identity and row version back after commit
    fn accept(&mut self);

    async fn resolve(
        &mut self,
        policy: ConflictPolicy,
        db: &DatabaseConnection,
    ) -> AppResult<Resolution>;
}

/// Pending change on one record.
pub(crate) struct Staged<T: Record> {
    state: ChangeState,
    entry: Entry<T>,
    original: RowVersion,
    written: Option<(i32, RowVersion)>,
}

impl<T: Record> Staged<T> {
    pub(crate) fn new(state: ChangeState, entry: Entry<T>) -> Self {
        let original = entry.row_version();
        Self {
            state,
            entry,
            original,
            written: None,
        }
    }

    /// Whether this change already tracks the row with identity `id`.
    ///
    /// Id 0 is a record that was never saved, so it can only be the
    /// pending insert.
    fn tracks(&self, id: i32) -> bool {
        match self.state {
            ChangeState::Added => id == 0,
            _ => id != 0 && self.entry.id() == id,
        }
    }

    /// Fold a later change of the same row into this one.
    ///
    /// The expected row version stays the one first read. Returns `false`
    /// when the two changes cancel out.
    fn restage(&mut self, state: ChangeState, value: T) -> bool {
        self.entry.replace(value);
        match (self.state, state) {
            (ChangeState::Added, ChangeState::Deleted) => false,
            (ChangeState::Added, _) => true,
            (_, next) => {
                self.state = next;
                true
            }
        }
    }

    fn active_model(value: &T, version: &RowVersion) -> T::ActiveModel {
        let mut model = value.to_active_model();
        model.not_set(T::id_column());
        model.set(T::version_column(), version.as_bytes().to_vec().into());
        model
    }
}

#[async_trait]
impl<T: Record> PendingChange for Staged<T> {
    fn entity(&self) -> &'static str {
        T::NAME
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn id(&self) -> i32 {
        self.entry.id()
    }

    fn validate(&self) -> AppResult<()> {
        match self.state {
            ChangeState::Added => Ok(self.entry.current().validate()?),
            _ if self.entry.id() == 0 => Err(AppError::validation(format!(
                "{} was never saved and cannot be updated or deleted",
                T::NAME
            ))),
            ChangeState::Modified => Ok(self.entry.current().validate()?),
            ChangeState::Deleted => Ok(()),
        }
    }

    async fn apply(&mut self, txn: &DatabaseTransaction) -> AppResult<Applied> {
        let value = self.entry.current();

        match self.state {
            ChangeState::Added => {
                let version = RowVersion::generate();
                let inserted = Self::active_model(&value, &version).insert(txn).await?;
                self.written = Some((T::from_model(inserted).id(), version));
                Ok(Applied::Rows(1))
            }
            ChangeState::Modified => {
                let version = RowVersion::next_after(&self.original);
                let result = T::Entity::update_many()
                    .set(Self::active_model(&value, &version))
                    .filter(T::id_column().eq(value.id()))
                    .filter(T::version_column().eq(self.original.as_bytes().to_vec()))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Ok(Applied::Conflict);
                }
                self.written = Some((value.id(), version));
                Ok(Applied::Rows(result.rows_affected))
            }
            ChangeState::Deleted => {
                let result = T::Entity::delete_many()
                    .filter(T::id_column().eq(value.id()))
                    .filter(T::version_column().eq(self.original.as_bytes().to_vec()))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Ok(Applied::Conflict);
                }
                Ok(Applied::Rows(result.rows_affected))
            }
        }
    }

    fn accept(&mut self) {
        if let Some((id, version)) = self.written.take() {
            self.entry.modify(|value| {
                value.set_id(id);
                value.set_row_version(version);
            });
        }
    }

    async fn resolve(
        &mut self,
        policy: ConflictPolicy,
        db: &DatabaseConnection,
    ) -> AppResult<Resolution> {
        concurrency::resolve(policy, self.state, &self.entry, &mut self.original, db).await
    }
}

enum CommitFailure {
    /// Indices of the conflicting changes
    Conflicts(Vec<usize>),
    Failed(AppError),
}

impl From<AppError> for CommitFailure {
    fn from(err: AppError) -> Self {
        Self::Failed(err)
    }
}

/// Session over one database: tracks pending changes until saved.
///
/// Shared between repositories through `Arc<DbContext>`.
pub struct DbContext {
    db: Arc<DatabaseConnection>,
    pending: Mutex<Vec<Box<dyn PendingChange>>>,
}

impl DbContext {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self {
            db: db.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Number of changes waiting to be saved
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Track a change of `value`, merged into the pending change of the
    /// same row when there is one.
    pub(crate) fn stage<T: Record>(&self, state: ChangeState, value: T) -> Entry<T> {
        let mut pending = self.pending.lock();

        if state != ChangeState::Added {
            if let Some(index) = tracked_index::<T>(&mut pending, value.id()) {
                if let Some(staged) = pending[index].as_any_mut().downcast_mut::<Staged<T>>() {
                    let keep = staged.restage(state, value);
                    let entry = staged.entry.clone();
                    if !keep {
                        pending.remove(index);
                    }
                    tracing::debug!(entity = T::NAME, ?state, keep, "Change merged");
                    return entry;
                }
            }
        }

        let entry = Entry::new(value);
        pending.push(Box::new(Staged::new(state, entry.clone())));
        entry
    }

    /// Put changes back in front of anything staged meanwhile.
    fn restore(&self, mut changes: Vec<Box<dyn PendingChange>>) {
        let mut pending = self.pending.lock();
        changes.append(&mut pending);
        *pending = changes;
    }

    /// Apply `changes` in one transaction.
    async fn commit(&self, changes: &mut [Box<dyn PendingChange>]) -> Result<u64, CommitFailure> {
        if changes.is_empty() {
            return Ok(0);
        }
        for change in changes.iter() {
            change.validate()?;
        }

        let txn = self.db.begin().await.map_err(AppError::from)?;

        let mut rows = 0;
        let mut conflicts = Vec::new();
        for (index, change) in changes.iter_mut().enumerate() {
            match change.apply(&txn).await {
                Ok(Applied::Rows(n)) => rows += n,
                Ok(Applied::Conflict) => conflicts.push(index),
                Err(e) => {
                    rollback(txn).await;
                    return Err(CommitFailure::Failed(e));
                }
            }
        }

        if !conflicts.is_empty() {
            rollback(txn).await;
            return Err(CommitFailure::Conflicts(conflicts));
        }

        txn.commit().await.map_err(AppError::from)?;

        for change in changes.iter_mut() {
            change.accept();
        }
        Ok(rows)
    }

    async fn save(&self, policy: Option<ConflictPolicy>) -> AppResult<u64> {
        let mut changes = std::mem::take(&mut *self.pending.lock());
        if changes.is_empty() {
            return Ok(0);
        }

        let mut attempt = 0;
        loop {
            let conflicts = match self.commit(&mut changes).await {
                Ok(rows) => {
                    tracing::info!(rows, changes = changes.len(), "Changes saved");
                    return Ok(rows);
                }
                Err(CommitFailure::Failed(e)) => {
                    self.restore(changes);
                    return Err(e);
                }
                Err(CommitFailure::Conflicts(conflicts)) => conflicts,
            };

            let first = &changes[conflicts[0]];
            let conflict = AppError::conflict(first.entity(), first.id());

            let policy = match policy {
                Some(policy) if attempt < MAX_CONFLICT_RETRIES => policy,
                _ => {
                    tracing::warn!(conflicts = conflicts.len(), "Save aborted on concurrency conflict");
                    self.restore(changes);
                    return Err(conflict);
                }
            };
            attempt += 1;

            // Reverse order keeps the remaining indices valid across removals.
            for &index in conflicts.iter().rev() {
                let (entity, id) = (changes[index].entity(), changes[index].id());
                match changes[index].resolve(policy, &self.db).await {
                    Ok(Resolution::Retry) => {}
                    Ok(Resolution::Discard) => {
                        changes.remove(index);
                    }
                    Ok(Resolution::Unresolved) => {
                        self.restore(changes);
                        return Err(AppError::conflict(entity, id));
                    }
                    Err(e) => {
                        self.restore(changes);
                        return Err(e);
                    }
                }
            }
        }
    }
}

/// Position of the pending change already tracking row `id` of `T`.
///
/// An unsaved record (id 0) is only matched when exactly one insert of `T`
/// is pending.
fn tracked_index<T: Record>(pending: &mut [Box<dyn PendingChange>], id: i32) -> Option<usize> {
    let mut matches = pending.iter_mut().enumerate().filter_map(|(index, change)| {
        let staged = change.as_any_mut().downcast_mut::<Staged<T>>()?;
        staged.tracks(id).then_some(index)
    });

    let first = matches.next()?;
    if id == 0 && matches.next().is_some() {
        return None;
    }
    Some(first)
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::error!("Transaction rollback failed: {}", e);
    }
}

#[async_trait]
impl UnitOfWork for DbContext {
    async fn save_changes(&self) -> AppResult<u64> {
        self.save(None).await
    }

    async fn save_changes_with(&self, policy: ConflictPolicy) -> AppResult<u64> {
        self.save(Some(policy)).await
    }

    fn has_changes(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    fn discard_changes(&self) {
        self.pending.lock().clear();
    }
}

impl fmt::Debug for DbContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContext")
            .field("pending", &self.pending.lock().len())
            .finish_non_exhaustive()
    }
}

impl Drop for DbContext {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().len();
        if pending > 0 {
            tracing::warn!(pending, "Context dropped with unsaved changes");
        }
    }
}
