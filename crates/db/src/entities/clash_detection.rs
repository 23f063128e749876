use sea_orm::entity::prelude::*;

use crate::types::{ClashSeverity, ClashStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clash_detections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub project_id: i64,
    pub clash_code: String,
    pub description: String,
    pub discipline_1: Option<String>,
    pub discipline_2: Option<String>,
    pub severity: ClashSeverity,
    pub status: ClashStatus,
    pub assigned_to: Option<i64>,
    pub due_date: Option<Date>,
    pub resolution: Option<String>,
    pub resolved_by: Option<i64>,
    pub resolved_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
