//! Error report exception entity (`error_report_exceptions` table).
//!
//! A fault and each of its causes are separate rows; `id_inner_exception`
//! points at the row of the direct cause.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use std::collections::{BTreeSet, HashMap};

use super::error_report_application;
use crate::domain::{ErrorReportApplication, ErrorReportException, RowVersion};
use crate::errors::AppResult;
use crate::infra::repositories::record::{unknown_navigation, Record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "error_report_exceptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub id_application: i32,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub source: Option<String>,
    pub site_module: Option<String>,
    pub site_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub stack_trace: Option<String>,
    pub help_link: Option<String>,
    pub date: DateTimeUtc,
    pub id_inner_exception: Option<i32>,
    pub row_version: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::error_report_application::Entity",
        from = "Column::IdApplication",
        to = "super::error_report_application::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Application,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::IdInnerException",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    InnerException,
}

impl Related<super::error_report_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Record for ErrorReportException {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const NAME: &'static str = "ErrorReportException";
    const NAVIGATIONS: &'static [&'static str] = &["application"];

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
            id_application: model.id_application,
            kind: model.kind,
            message: model.message,
            source: model.source,
            site_module: model.site_module,
            site_name: model.site_name,
            stack_trace: model.stack_trace,
            help_link: model.help_link,
            date: model.date,
            id_inner_exception: model.id_inner_exception,
            row_version: RowVersion::from_bytes(model.row_version),
            application: None,
        }
    }

    fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: Set(self.id),
            id_application: Set(self.id_application),
            kind: Set(self.kind.clone()),
            message: Set(self.message.clone()),
            source: Set(self.source.clone()),
            site_module: Set(self.site_module.clone()),
            site_name: Set(self.site_name.clone()),
            stack_trace: Set(self.stack_trace.clone()),
            help_link: Set(self.help_link.clone()),
            date: Set(self.date),
            id_inner_exception: Set(self.id_inner_exception),
            row_version: Set(self.row_version.as_bytes().to_vec()),
        }
    }

    async fn load_navigation(
        records: &mut [Self],
        navigation: &str,
        db: &DatabaseConnection,
    ) -> AppResult<()> {
        match navigation {
            "application" => {
                let ids: BTreeSet<i32> = records.iter().map(|e| e.id_application).collect();
                if ids.is_empty() {
                    return Ok(());
                }

                let applications: HashMap<i32, ErrorReportApplication> =
                    error_report_application::Entity::find()
                        .filter(error_report_application::Column::Id.is_in(ids))
                        .all(db)
                        .await?
                        .into_iter()
                        .map(|model| (model.id, ErrorReportApplication::from_model(model)))
                        .collect();

                for exception in records.iter_mut() {
                    exception.application = applications.get(&exception.id_application).cloned();
                }
                Ok(())
            }
            other => Err(unknown_navigation::<Self>(other)),
        }
    }
}
