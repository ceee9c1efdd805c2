//! Category repository.

use async_trait::async_trait;
use sea_orm::ColumnTrait;
use std::sync::Arc;

use super::entities::category;
use super::generic::{forward_repository, GenericRepository};
use super::{Query, Repository};
use crate::domain::Category;
use crate::errors::AppResult;
use crate::infra::DbContext;

#[async_trait]
pub trait CategoryRepository: Repository<Category> {
    async fn find_by_title(&self, title: &str) -> AppResult<Option<Category>> {
        let found = self
            .get(Query::new().filter(category::Column::Title.eq(title)))
            .await?;
        Ok(found.into_iter().next())
    }

    /// Category with its articles loaded
    async fn with_articles(&self, id: i32) -> AppResult<Option<Category>> {
        let found = self
            .get(
                Query::new()
                    .filter(category::Column::Id.eq(id))
                    .include("articles"),
            )
            .await?;
        Ok(found.into_iter().next())
    }
}

pub struct CategoriesRepository {
    inner: GenericRepository<Category>,
}

impl CategoriesRepository {
    pub fn new(context: Arc<DbContext>) -> Self {
        Self {
            inner: GenericRepository::new(context),
        }
    }
}

forward_repository!(CategoriesRepository, Category);

impl CategoryRepository for CategoriesRepository {}
