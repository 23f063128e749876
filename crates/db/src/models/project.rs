use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::{Priority, ProjectStatus};
use crate::{entities::project, models::ids};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Project code {0} already exists")]
    DuplicateCode(String),
    #[error("Project name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub project_number: i32,
    pub project_code: String,
    pub name: String,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub authority_client: Option<String>,
    pub switzel_client: Option<String>,
    pub location: Option<String>,
    pub scope_of_work: Option<String>,
    #[ts(type = "unknown")]
    pub bim_requirements: Option<serde_json::Value>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: i32,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub director_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub project_code: Option<String>,
    pub project_number: Option<i32>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub authority_client: Option<String>,
    pub switzel_client: Option<String>,
    pub location: Option<String>,
    pub scope_of_work: Option<String>,
    #[ts(type = "unknown")]
    pub bim_requirements: Option<serde_json::Value>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<i32>,
    pub budget: Option<f64>,
    pub director_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub authority_client: Option<String>,
    pub switzel_client: Option<String>,
    pub location: Option<String>,
    pub scope_of_work: Option<String>,
    #[ts(type = "unknown")]
    pub bim_requirements: Option<serde_json::Value>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<i32>,
    pub budget: Option<f64>,
    pub actual_cost: Option<f64>,
    pub director_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
}

/// Derive a short code from the capital letters of the project name,
/// e.g. "Marina Bay Towers" becomes "MBT".
pub fn derive_project_code(name: &str, number: i32) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let prefix = if initials.is_empty() {
        "PRJ".to_string()
    } else {
        initials
    };
    format!("{prefix}-{number:03}")
}

pub fn clamp_progress(progress: i32) -> i32 {
    progress.clamp(0, 100)
}

impl Project {
    async fn from_model<C: ConnectionTrait>(db: &C, model: project::Model) -> Result<Self, DbErr> {
        let director_id = match model.director_id {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        let project_manager_id = match model.project_manager_id {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            project_number: model.project_number,
            project_code: model.project_code,
            name: model.name,
            description: model.description,
            sector: model.sector,
            authority_client: model.authority_client,
            switzel_client: model.switzel_client,
            location: model.location,
            scope_of_work: model.scope_of_work,
            bim_requirements: model.bim_requirements,
            timeline_start: model.timeline_start,
            timeline_end: model.timeline_end,
            status: model.status,
            priority: model.priority,
            progress: model.progress,
            budget: model.budget,
            actual_cost: model.actual_cost,
            director_id,
            project_manager_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        project::Entity::find().count(db).await
    }

    pub async fn count_by_status<C: ConnectionTrait>(
        db: &C,
        status: ProjectStatus,
    ) -> Result<u64, DbErr> {
        project::Entity::find()
            .filter(project::Column::Status.eq(status))
            .count(db)
            .await
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = project::Entity::find()
            .order_by_asc(project::Column::ProjectNumber)
            .all(db)
            .await?;
        let mut projects = Vec::with_capacity(records.len());
        for record in records {
            projects.push(Self::from_model(db, record).await?);
        }
        Ok(projects)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(record) => Ok(Some(Self::from_model(db, record).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_code<C: ConnectionTrait>(
        db: &C,
        code: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::ProjectCode.eq(code))
            .one(db)
            .await?;
        match record {
            Some(record) => Ok(Some(Self::from_model(db, record).await?)),
            None => Ok(None),
        }
    }

    async fn next_project_number<C: ConnectionTrait>(db: &C) -> Result<i32, DbErr> {
        let numbers: Vec<i32> = project::Entity::find()
            .select_only()
            .column(project::Column::ProjectNumber)
            .into_tuple()
            .all(db)
            .await?;
        Ok(numbers.into_iter().max().unwrap_or(0) + 1)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProject,
    ) -> Result<Self, ProjectError> {
        if data.name.trim().is_empty() {
            return Err(ProjectError::EmptyName);
        }
        let number = match data.project_number {
            Some(n) => n,
            None => Self::next_project_number(db).await?,
        };
        let code = match &data.project_code {
            Some(code) => code.clone(),
            None => derive_project_code(&data.name, number),
        };
        if Self::find_by_code(db, &code).await?.is_some() {
            return Err(ProjectError::DuplicateCode(code));
        }

        let director_id = match data.director_id {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let project_manager_id = match data.project_manager_id {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };

        let now = Utc::now();
        let active = project::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_number: Set(number),
            project_code: Set(code),
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            sector: Set(data.sector.clone()),
            authority_client: Set(data.authority_client.clone()),
            switzel_client: Set(data.switzel_client.clone()),
            location: Set(data.location.clone()),
            scope_of_work: Set(data.scope_of_work.clone()),
            bim_requirements: Set(data.bim_requirements.clone()),
            timeline_start: Set(data.timeline_start),
            timeline_end: Set(data.timeline_end),
            status: Set(data.status.clone().unwrap_or_default()),
            priority: Set(data.priority.clone().unwrap_or_default()),
            progress: Set(clamp_progress(data.progress.unwrap_or(0))),
            budget: Set(data.budget),
            actual_cost: Set(None),
            director_id: Set(director_id),
            project_manager_id: Set(project_manager_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateProject,
    ) -> Result<Self, ProjectError> {
        let record = project::Entity::find()
            .filter(project::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(ProjectError::ProjectNotFound)?;

        let mut active: project::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            if name.trim().is_empty() {
                return Err(ProjectError::EmptyName);
            }
            active.name = Set(name);
        }
        if payload.description.is_some() {
            active.description = Set(payload.description.clone());
        }
        if payload.sector.is_some() {
            active.sector = Set(payload.sector.clone());
        }
        if payload.authority_client.is_some() {
            active.authority_client = Set(payload.authority_client.clone());
        }
        if payload.switzel_client.is_some() {
            active.switzel_client = Set(payload.switzel_client.clone());
        }
        if payload.location.is_some() {
            active.location = Set(payload.location.clone());
        }
        if payload.scope_of_work.is_some() {
            active.scope_of_work = Set(payload.scope_of_work.clone());
        }
        if payload.bim_requirements.is_some() {
            active.bim_requirements = Set(payload.bim_requirements.clone());
        }
        if payload.timeline_start.is_some() {
            active.timeline_start = Set(payload.timeline_start);
        }
        if payload.timeline_end.is_some() {
            active.timeline_end = Set(payload.timeline_end);
        }
        if let Some(status) = payload.status.clone() {
            active.status = Set(status);
        }
        if let Some(priority) = payload.priority.clone() {
            active.priority = Set(priority);
        }
        if let Some(progress) = payload.progress {
            active.progress = Set(clamp_progress(progress));
        }
        if payload.budget.is_some() {
            active.budget = Set(payload.budget);
        }
        if payload.actual_cost.is_some() {
            active.actual_cost = Set(payload.actual_cost);
        }
        if let Some(uuid) = payload.director_id {
            active.director_id = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        if let Some(uuid) = payload.project_manager_id {
            active.project_manager_id = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    /// Child rows (tasks, teams, files, clashes, KPIs) go with the project
    /// through ON DELETE CASCADE.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ProjectError> {
        let result = project::Entity::delete_many()
            .filter(project::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ProjectError::ProjectNotFound);
        }
        Ok(())
    }

    pub async fn average_progress<C: ConnectionTrait>(db: &C) -> Result<f64, DbErr> {
        let values: Vec<i32> = project::Entity::find()
            .select_only()
            .column(project::Column::Progress)
            .into_tuple()
            .all(db)
            .await?;
        if values.is_empty() {
            return Ok(0.0);
        }
        Ok(values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_code_uses_name_initials() {
        assert_eq!(derive_project_code("Marina Bay Towers", 7), "MBT-007");
        assert_eq!(derive_project_code("downtown hospital", 12), "DH-012");
    }

    #[test]
    fn project_code_falls_back_without_letters() {
        assert_eq!(derive_project_code("2025", 3), "PRJ-003");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(250), 100);
    }
}
