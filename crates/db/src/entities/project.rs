use sea_orm::entity::prelude::*;

use crate::types::{Priority, ProjectStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub project_number: i32,
    pub project_code: String,
    pub name: String,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub authority_client: Option<String>,
    pub switzel_client: Option<String>,
    pub location: Option<String>,
    pub scope_of_work: Option<String>,
    pub bim_requirements: Option<Json>,
    pub timeline_start: Option<Date>,
    pub timeline_end: Option<Date>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: i32,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub director_id: Option<i64>,
    pub project_manager_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
