//! Customer entity (`customers` table).

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Customer, RowVersion};
use crate::infra::repositories::record::Record;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub row_version: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Record for Customer {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const NAME: &'static str = "Customer";

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
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            row_version: RowVersion::from_bytes(model.row_version),
        }
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            first_name: Set(self.first_name.clone()),
            last_name: Set(self.last_name.clone()),
            email: Set(self.email.clone()),
            row_version: Set(self.row_version.as_bytes().to_vec()),
        }
    }
}
