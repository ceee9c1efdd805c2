//! Article entity (`articles` table).

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use std::collections::{BTreeSet, HashMap};

use super::category;
use crate::domain::{Article, Category, RowVersion};
use crate::errors::AppResult;
use crate::infra::repositories::record::{unknown_navigation, Record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub description: String,
    pub images_path: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub price: Decimal,
    pub row_version: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Record for Article {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const NAME: &'static str = "Article";
    const NAVIGATIONS: &'static [&'static str] = &["category"];

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
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            images_path: model.images_path,
            price: model.price,
            row_version: RowVersion::from_bytes(model.row_version),
            category: None,
        }
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            category_id: Set(self.category_id),
            title: Set(self.title.clone()),
            description: Set(self.description.clone()),
            images_path: Set(self.images_path),
            price: Set(self.price),
            row_version: Set(self.row_version.as_bytes().to_vec()),
        }
    }

    async fn load_navigation(
        records: &mut [Self],
        navigation: &str,
        db: &DatabaseConnection,
    ) -> AppResult<()> {
        match navigation {
            "category" => {
                let ids: BTreeSet<i32> = records.iter().map(|a| a.category_id).collect();
                if ids.is_empty() {
                    return Ok(());
                }

                let categories: HashMap<i32, Category> = category::Entity::find()
                    .filter(category::Column::Id.is_in(ids))
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|model| (model.id, Category::from_model(model)))
                    .collect();

                for article in records.iter_mut() {
                    article.category = categories.get(&article.category_id).cloned();
                }
                Ok(())
            }
            other => Err(unknown_navigation::<Self>(other)),
        }
    }
}
