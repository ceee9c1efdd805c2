//! Error report application entity (`error_report_applications` table).

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use std::collections::HashMap;

use super::error_report_exception;
use crate::domain::{ErrorReportApplication, ErrorReportException, RowVersion};
use crate::errors::AppResult;
use crate::infra::repositories::record::{unknown_navigation, Record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "error_report_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub version: String,
    pub first_run_date: DateTimeUtc,
    pub row_version: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::error_report_exception::Entity")]
    Exceptions,
}

impl Related<super::error_report_exception::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exceptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Record for ErrorReportApplication {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const NAME: &'static str = "ErrorReportApplication";
    const NAVIGATIONS: &'static [&'static str] = &["exceptions"];

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
            name: model.name,
            version: model.version,
            first_run_date: model.first_run_date,
            row_version: RowVersion::from_bytes(model.row_version),
            exceptions: Vec::new(),
        }
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            version: Set(self.version.clone()),
            first_run_date: Set(self.first_run_date),
            row_version: Set(self.row_version.as_bytes().to_vec()),
        }
    }

    async fn load_navigation(
        records: &mut [Self],
        navigation: &str,
        db: &DatabaseConnection,
    ) -> AppResult<()> {
        match navigation {
            "exceptions" => {
                if records.is_empty() {
                    return Ok(());
                }
                let ids: Vec<i32> = records.iter().map(|a| a.id).collect();

                let mut by_application: HashMap<i32, Vec<ErrorReportException>> = HashMap::new();
                for model in error_report_exception::Entity::find()
                    .filter(error_report_exception::Column::IdApplication.is_in(ids))
                    .order_by_asc(error_report_exception::Column::Id)
                    .all(db)
                    .await?
                {
                    let exception = ErrorReportException::from_model(model);
                    by_application
                        .entry(exception.id_application)
                        .or_default()
                        .push(exception);
                }

                for application in records.iter_mut() {
                    application.exceptions =
                        by_application.remove(&application.id).unwrap_or_default();
                }
                Ok(())
            }
            other => Err(unknown_navigation::<Self>(other)),
        }
    }
}
