use sea_orm::entity::prelude::*;

use crate::types::BimFileStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bim_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub project_id: i64,
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub version: Option<String>,
    pub lod_level: Option<String>,
    pub discipline: Option<String>,
    pub status: BimFileStatus,
    pub uploaded_by: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
