//! Category entity (`categories` table).

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use std::collections::HashMap;

use super::article;
use crate::domain::{Article, Category, RowVersion};
use crate::errors::AppResult;
use crate::infra::repositories::record::{unknown_navigation, Record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub row_version: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Record for Category {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const NAME: &'static str = "Category";
    const NAVIGATIONS: &'static [&'static str] = &["articles"];

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn row_version(&self) -> &RowVersion {
        &self.row_version
    }

    fn set_row_version(&mut self, version: RowVersion) {
        self.row_version = version;
    }

    fn id_column() -> Column {
        Column::Id
    }

    fn version_column() -> Column {
        Column::RowVersion
    }

    fn from_model(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            row_version: RowVersion::from_bytes(model.row_version),
            articles: Vec::new(),
        }
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            title: Set(self.title.clone()),
            row_version: Set(self.row_version.as_bytes().to_vec()),
        }
    }

    async fn load_navigation(
        records: &mut [Self],
        navigation: &str,
        db: &DatabaseConnection,
    ) -> AppResult<()> {
        match navigation {
            "articles" => {
                if records.is_empty() {
                    return Ok(());
                }
                let ids: Vec<i32> = records.iter().map(|c| c.id).collect();

                let mut by_category: HashMap<i32, Vec<Article>> = HashMap::new();
                for model in article::Entity::find()
                    .filter(article::Column::CategoryId.is_in(ids))
                    .order_by_asc(article::Column::Id)
                    .all(db)
                    .await?
                {
                    let article = Article::from_model(model);
                    by_category.entry(article.category_id).or_default().push(article);
                }

                for category in records.iter_mut() {
                    category.articles = by_category.remove(&category.id).unwrap_or_default();
                }
                Ok(())
            }
            other => Err(unknown_navigation::<Self>(other)),
        }
    }
}
