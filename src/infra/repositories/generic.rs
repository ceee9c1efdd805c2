//! Generic repository over any [`Record`].
//!
//! Writes are staged on the shared [`DbContext`] and reach the database on
//! the next `save_changes`. Reads go straight to the connection.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Statement, Value,
};
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::query::{check_placeholders, Query};
use super::record::Record;
use crate::errors::AppResult;
use crate::infra::unit_of_work::{ChangeState, DbContext, Entry};
use crate::types::{Paginated, PaginationParams};

/// Repository operations available for every record type.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Track `entity` for insertion on the next save.
    fn insert(&self, entity: T) -> Entry<T>;

    /// Track `entity` for update on the next save.
    ///
    /// The update only applies if the stored row still has the row version
    /// carried by `entity`. Updating a row already tracked by the context
    /// amends that change instead of adding a second one.
    fn update(&self, entity: T) -> Entry<T>;

    /// Track `entity` for deletion on the next save.
    fn delete(&self, entity: T);

    /// Look `id` up and track it for deletion; absent ids are a no-op.
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<T>>;

    async fn get(&self, query: Query<T>) -> AppResult<Vec<T>>;

    /// Run a hand-written SELECT returning this record's columns.
    ///
    /// Placeholders use the backend's syntax and must match `values`.
    async fn get_with_raw_sql(&self, sql: &str, values: Vec<Value>) -> AppResult<Vec<T>>;

    async fn count(&self, query: Query<T>) -> AppResult<u64>;

    async fn get_page(&self, query: Query<T>, params: PaginationParams)
        -> AppResult<Paginated<T>>;
}

/// SeaORM-backed [`Repository`] sharing a [`DbContext`].
pub struct GenericRepository<T: Record> {
    context: Arc<DbContext>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> GenericRepository<T> {
    pub fn new(context: Arc<DbContext>) -> Self {
        Self {
            context,
            _record: PhantomData,
        }
    }

    pub fn context(&self) -> &Arc<DbContext> {
        &self.context
    }

    fn db(&self) -> &DatabaseConnection {
        self.context.connection()
    }

    fn track(&self, state: ChangeState, entity: T) -> Entry<T> {
        tracing::debug!(entity = T::NAME, id = entity.id(), ?state, "Change staged");
        self.context.stage(state, entity)
    }

    async fn load_includes(&self, query: &Query<T>, records: &mut [T]) -> AppResult<()> {
        for navigation in query.included() {
            T::load_navigation(records, navigation, self.db()).await?;
        }
        Ok(())
    }
}

impl<T: Record> Clone for GenericRepository<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.context))
    }
}

#[async_trait]
impl<T: Record> Repository<T> for GenericRepository<T> {
    fn insert(&self, entity: T) -> Entry<T> {
        self.track(ChangeState::Added, entity)
    }

    fn update(&self, entity: T) -> Entry<T> {
        self.track(ChangeState::Modified, entity)
    }

    fn delete(&self, entity: T) {
        self.track(ChangeState::Deleted, entity);
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        match self.get_by_id(id).await? {
            Some(entity) => self.delete(entity),
            None => tracing::debug!(entity = T::NAME, id, "Nothing to delete"),
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<T>> {
        let model = T::Entity::find()
            .filter(T::id_column().eq(id))
            .one(self.db())
            .await?;
        Ok(model.map(T::from_model))
    }

    async fn get(&self, query: Query<T>) -> AppResult<Vec<T>> {
        query.check_includes()?;
        tracing::debug!(?query, "Running query");

        let mut records: Vec<T> = query
            .select()
            .all(self.db())
            .await?
            .into_iter()
            .map(T::from_model)
            .collect();

        self.load_includes(&query, &mut records).await?;
        Ok(records)
    }

    async fn get_with_raw_sql(&self, sql: &str, values: Vec<Value>) -> AppResult<Vec<T>> {
        let backend = self.db().get_database_backend();
        check_placeholders(sql, backend, values.len())?;
        tracing::debug!(entity = T::NAME, sql, "Running raw query");

        let models = T::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(backend, sql, values))
            .all(self.db())
            .await?;
        Ok(models.into_iter().map(T::from_model).collect())
    }

    async fn count(&self, query: Query<T>) -> AppResult<u64> {
        Ok(query.select().count(self.db()).await?)
    }

    async fn get_page(
        &self,
        query: Query<T>,
        params: PaginationParams,
    ) -> AppResult<Paginated<T>> {
        query.check_includes()?;

        let paginator = query.select().paginate(self.db(), params.limit());
        let total = paginator.num_items().await?;
        let mut records: Vec<T> = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(T::from_model)
            .collect();

        self.load_includes(&query, &mut records).await?;
        Ok(Paginated::new(records, params.page, params.limit(), total))
    }
}

/// Implement [`Repository`] for a wrapper struct by forwarding to its
/// `inner` generic repository.
macro_rules! forward_repository {
    ($repo:ty, $record:ty) => {
        #[async_trait::async_trait]
        impl $crate::infra::repositories::Repository<$record> for $repo {
            fn insert(&self, entity: $record) -> $crate::infra::Entry<$record> {
                $crate::infra::repositories::Repository::insert(&self.inner, entity)
            }

            fn update(&self, entity: $record) -> $crate::infra::Entry<$record> {
                $crate::infra::repositories::Repository::update(&self.inner, entity)
            }

            fn delete(&self, entity: $record) {
                $crate::infra::repositories::Repository::delete(&self.inner, entity)
            }

            async fn delete_by_id(&self, id: i32) -> $crate::errors::AppResult<()> {
                $crate::infra::repositories::Repository::delete_by_id(&self.inner, id).await
            }

            async fn get_by_id(&self, id: i32) -> $crate::errors::AppResult<Option<$record>> {
                $crate::infra::repositories::Repository::get_by_id(&self.inner, id).await
            }

            async fn get(
                &self,
                query: $crate::infra::repositories::Query<$record>,
            ) -> $crate::errors::AppResult<Vec<$record>> {
                $crate::infra::repositories::Repository::get(&self.inner, query).await
            }

            async fn get_with_raw_sql(
                &self,
                sql: &str,
                values: Vec<sea_orm::Value>,
            ) -> $crate::errors::AppResult<Vec<$record>> {
                $crate::infra::repositories::Repository::get_with_raw_sql(&self.inner, sql, values).await
            }

            async fn count(
                &self,
                query: $crate::infra::repositories::Query<$record>,
            ) -> $crate::errors::AppResult<u64> {
                $crate::infra::repositories::Repository::count(&self.inner, query).await
            }

            async fn get_page(
                &self,
                query: $crate::infra::repositories::Query<$record>,
                params: $crate::types::PaginationParams,
            ) -> $crate::errors::AppResult<$crate::types::Paginated<$record>> {
                $crate::infra::repositories::Repository::get_page(&self.inner, query, params).await
            }
        }
    };
}

pub(crate) use forward_repository;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Article, RowVersion};
    use crate::errors::AppError;
    use crate::infra::repositories::entities::article;
    use crate::infra::UnitOfWork;
    use sea_orm::prelude::{Decimal, Uuid};
    use sea_orm::{DatabaseBackend, MockDatabase, QueryOrder, QueryTrait, Transaction};

    fn article_model(id: i32, title: &str, price: i64) -> article::Model {
        article::Model {
            id,
            category_id: 1,
            title: title.to_string(),
            description: String::new(),
            images_path: Uuid::nil(),
            price: Decimal::new(price, 0),
            row_version: vec![0; 8],
        }
    }

    fn repository(db: &Arc<DatabaseConnection>) -> GenericRepository<Article> {
        GenericRepository::new(Arc::new(DbContext::new(Arc::clone(db))))
    }

    /// Statements sent through `db`, once every repository using it is gone.
    fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
        Arc::into_inner(db)
            .expect("connection still shared")
            .into_transaction_log()
    }

    #[tokio::test]
    async fn test_get_sends_filter_and_order() {
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                article_model(4, "Test Article 4", 900_000),
                article_model(3, "Test Article 3", 750_000),
            ]])
            .into_connection()
            .into();
        let repo = repository(&db);

        let articles = repo
            .get(
                Query::new()
                    .filter(article::Column::Price.gte(500_000))
                    .order_by_desc(article::Column::Price),
            )
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Test Article 4");
        assert_eq!(articles[0].row_version, RowVersion::from_bytes(vec![0; 8]));

        drop(repo);
        let log = transaction_log(db);
        assert_eq!(
            log,
            [Transaction::one(
                article::Entity::find()
                    .filter(article::Column::Price.gte(500_000))
                    .order_by_desc(article::Column::Price)
                    .build(DatabaseBackend::Postgres)
            )]
        );
    }

    #[tokio::test]
    async fn test_raw_sql_is_sent_verbatim() {
        let sql = r#"SELECT * FROM "articles" WHERE "price" > $1"#;
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article_model(1, "Article 1", 100)]])
            .into_connection()
            .into();
        let repo = repository(&db);

        let articles = repo
            .get_with_raw_sql(sql, vec![Decimal::new(50, 0).into()])
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
        drop(repo);
        let log = transaction_log(db);
        assert_eq!(
            log,
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                [Decimal::new(50, 0).into()]
            )]
        );
    }

    #[tokio::test]
    async fn test_raw_sql_rejects_missing_values() {
        let db: Arc<DatabaseConnection> =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = repository(&db);

        let err = repo
            .get_with_raw_sql(r#"SELECT * FROM "articles" WHERE "id" = $1"#, Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_unknown_include_fails_before_querying() {
        let db: Arc<DatabaseConnection> =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = repository(&db);

        let err = repo
            .get(Query::new().include("supplier"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidQuery(_)));
        drop(repo);
        assert!(transaction_log(db).is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_deferred_until_save() {
        let db: Arc<DatabaseConnection> =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = repository(&db);

        let entry = repo.insert(Article::new(1, "Draft", "", Decimal::new(10, 0)));

        assert_eq!(entry.id(), 0);
        assert!(repo.context().has_changes());
        repo.context().discard_changes();
        drop(repo);
        assert!(transaction_log(db).is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_id_of_missing_row_stages_nothing() {
        let db: Arc<DatabaseConnection> = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<article::Model>::new()])
            .into_connection()
            .into();
        let repo = repository(&db);

        repo.delete_by_id(42).await.unwrap();

        assert!(!repo.context().has_changes());
    }
}
