use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::TeamType;
use crate::{entities::project_team, models::ids};

#[derive(Debug, Error)]
pub enum TeamError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Team member not found")]
    MemberNotFound,
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TeamMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub team_type: TeamType,
    pub role: String,
    pub user_id: Option<Uuid>,
    pub custom_name: Option<String>,
    pub is_lead: bool,
    pub assigned_tasks: i32,
    pub completed_tasks: i32,
    pub efficiency: Option<f64>,
    pub assigned_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTeamMember {
    pub project_id: Uuid,
    pub team_type: TeamType,
    pub role: String,
    pub user_id: Option<Uuid>,
    pub custom_name: Option<String>,
    pub is_lead: Option<bool>,
    pub assigned_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateTeamMember {
    pub team_type: Option<TeamType>,
    pub role: Option<String>,
    pub user_id: Option<Uuid>,
    pub custom_name: Option<String>,
    pub is_lead: Option<bool>,
    pub assigned_tasks: Option<i32>,
    pub completed_tasks: Option<i32>,
    pub efficiency: Option<f64>,
    pub status: Option<String>,
}

impl TeamMember {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: project_team::Model,
    ) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let user_id = match model.user_id {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            team_type: model.team_type,
            role: model.role,
            user_id,
            custom_name: model.custom_name,
            is_lead: model.is_lead,
            assigned_tasks: model.assigned_tasks,
            completed_tasks: model.completed_tasks,
            efficiency: model.efficiency,
            assigned_date: model.assigned_date,
            status: model.status,
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = project_team::Entity::find()
            .order_by_asc(project_team::Column::ProjectId)
            .order_by_asc(project_team::Column::Id)
            .all(db)
            .await?;
        let mut members = Vec::with_capacity(records.len());
        for record in records {
            members.push(Self::from_model(db, record).await?);
        }
        Ok(members)
    }

    pub async fn find_by_project<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, TeamError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(TeamError::ProjectNotFound)?;
        let records = project_team::Entity::find()
            .filter(project_team::Column::ProjectId.eq(project_row_id))
            .order_by_asc(project_team::Column::Id)
            .all(db)
            .await?;
        let mut members = Vec::with_capacity(records.len());
        for record in records {
            members.push(Self::from_model(db, record).await?);
        }
        Ok(members)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTeamMember,
    ) -> Result<Self, TeamError> {
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(TeamError::ProjectNotFound)?;
        let user_row_id = match data.user_id {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let active = project_team::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_id: Set(project_row_id),
            team_type: Set(data.team_type.clone()),
            role: Set(data.role.clone()),
            user_id: Set(user_row_id),
            custom_name: Set(data.custom_name.clone()),
            is_lead: Set(data.is_lead.unwrap_or(false)),
            assigned_tasks: Set(0),
            completed_tasks: Set(0),
            efficiency: Set(None),
            assigned_date: Set(data.assigned_date),
            status: Set("active".to_string()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateTeamMember,
    ) -> Result<Self, TeamError> {
        let record = project_team::Entity::find()
            .filter(project_team::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TeamError::MemberNotFound)?;

        let mut active: project_team::ActiveModel = record.into();
        if let Some(team_type) = payload.team_type.clone() {
            active.team_type = Set(team_type);
        }
        if let Some(role) = payload.role.clone() {
            active.role = Set(role);
        }
        if let Some(uuid) = payload.user_id {
            active.user_id = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        if payload.custom_name.is_some() {
            active.custom_name = Set(payload.custom_name.clone());
        }
        if let Some(is_lead) = payload.is_lead {
            active.is_lead = Set(is_lead);
        }
        if let Some(assigned) = payload.assigned_tasks {
            active.assigned_tasks = Set(assigned.max(0));
        }
        if let Some(completed) = payload.completed_tasks {
            active.completed_tasks = Set(completed.max(0));
        }
        if payload.efficiency.is_some() {
            active.efficiency = Set(payload.efficiency);
        }
        if let Some(status) = payload.status.clone() {
            active.status = Set(status);
        }

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), TeamError> {
        let result = project_team::Entity::delete_many()
            .filter(project_team::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TeamError::MemberNotFound);
        }
        Ok(())
    }

    /// Total head count across all project teams.
    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        project_team::Entity::find().count(db).await
    }
}
