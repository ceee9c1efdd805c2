//! Binding between a domain record and its SeaORM entity.
//!
//! Every type handled by the generic repository is a [`Record`]: it has an
//! integer identity, an opaque row version, and knows how to convert from and
//! to the entity's models. Navigation properties are loaded by name.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel,
};
use std::fmt::Debug;
use validator::Validate;

use crate::domain::RowVersion;
use crate::errors::{AppError, AppResult};

/// Domain record persisted through the generic repository.
#[async_trait]
pub trait Record: Clone + Debug + Send + Sync + Validate + 'static {
    type Entity: EntityTrait<Model = Self::Model, Column = Self::Column>;
    type Model: FromQueryResult + IntoActiveModel<Self::ActiveModel> + Send + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + 'static;
    type Column: ColumnTrait + Send + Sync;

    /// Name used in logs and conflict errors
    const NAME: &'static str;

    /// Navigation properties accepted by [`Record::load_navigation`]
    const NAVIGATIONS: &'static [&'static str] = &[];

    fn id(&self) -> i32;

    fn set_id(&mut self, id: i32);

    fn row_version(&self) -> &RowVersion;

    fn set_row_version(&mut self, version: RowVersion);

    fn id_column() -> Self::Column;

    fn version_column() -> Self::Column;

    fn from_model(model: Self::Model) -> Self;

    /// Active model with every column set from this record
    fn to_active_model(&self) -> Self::ActiveModel;

    /// Eagerly load one navigation property for all `records` at once.
    async fn load_navigation(
        records: &mut [Self],
        navigation: &str,
        db: &DatabaseConnection,
    ) -> AppResult<()> {
        let _ = (records, db);
        Err(unknown_navigation::<Self>(navigation))
    }
}

/// Error for an include name the record does not declare.
pub fn unknown_navigation<T: Record>(navigation: &str) -> AppError {
    AppError::invalid_query(format!(
        "{} has no navigation property '{}' (known: {})",
        T::NAME,
        navigation,
        T::NAVIGATIONS.join(", ")
    ))
}
