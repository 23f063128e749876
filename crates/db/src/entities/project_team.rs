use sea_orm::entity::prelude::*;

use crate::types::TeamType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "project_teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub project_id: i64,
    pub team_type: TeamType,
    pub role: String,
    pub user_id: Option<i64>,
    pub custom_name: Option<String>,
    pub is_lead: bool,
    pub assigned_tasks: i32,
    pub completed_tasks: i32,
    pub efficiency: Option<f64>,
    pub assigned_date: Option<Date>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
