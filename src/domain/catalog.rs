//! Catalog domain entities: articles and their categories.

use sea_orm::prelude::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::RowVersion;

/// Article for sale, owned by one category.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Article {
    pub id: i32,
    pub category_id: i32,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 1024))]
    pub description: String,
    /// Identifier of the folder holding the article's images
    pub images_path: Uuid,
    pub price: Decimal,
    pub row_version: RowVersion,
    /// Loaded only when the `category` navigation is included
    pub category: Option<Category>,
}

impl Article {
    /// Create a new, not yet persisted article
    pub fn new(
        category_id: i32,
        title: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: 0,
            category_id,
            title: title.into(),
            description: description.into(),
            images_path: Uuid::new_v4(),
            price,
            row_version: RowVersion::empty(),
            category: None,
        }
    }
}

/// Category grouping articles.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Category {
    pub id: i32,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub row_version: RowVersion,
    /// Loaded only when the `articles` navigation is included
    pub articles: Vec<Article>,
}

impl Category {
    /// Create a new, not yet persisted category
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            row_version: RowVersion::empty(),
            articles: Vec::new(),
        }
    }
}
