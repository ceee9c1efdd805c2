//! Article repository - catalog queries on top of the generic repository.

use async_trait::async_trait;
use sea_orm::prelude::Decimal;
use sea_orm::ColumnTrait;
use std::sync::Arc;

use super::entities::article;
use super::generic::{forward_repository, GenericRepository};
use super::{Query, Repository};
use crate::domain::Article;
use crate::errors::AppResult;
use crate::infra::DbContext;

/// Article-specific queries.
#[async_trait]
pub trait ArticleRepository: Repository<Article> {
    /// Articles of one category, cheapest first
    async fn in_category(&self, category_id: i32) -> AppResult<Vec<Article>> {
        self.get(
            Query::new()
                .filter(article::Column::CategoryId.eq(category_id))
                .order_by_asc(article::Column::Price),
        )
        .await
    }

    /// Articles priced at or above `price`, most expensive first
    async fn priced_at_least(&self, price: Decimal) -> AppResult<Vec<Article>> {
        self.get(
            Query::new()
                .filter(article::Column::Price.gte(price))
                .order_by_desc(article::Column::Price),
        )
        .await
    }
}

/// SeaORM implementation of [`ArticleRepository`].
pub struct ArticlesRepository {
    inner: GenericRepository<Article>,
}

impl ArticlesRepository {
    pub fn new(context: Arc<DbContext>) -> Self {
        Self {
            inner: GenericRepository::new(context),
        }
    }
}

forward_repository!(ArticlesRepository, Article);

impl ArticleRepository for ArticlesRepository {}
