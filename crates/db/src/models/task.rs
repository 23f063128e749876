use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::{Priority, TaskStatus};
use crate::{entities::task, models::{ids, project::clamp_progress}};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    TaskNotFound,
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Task name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub task_code: String,
    pub name: String,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub discipline: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: i32,
    pub status: TaskStatus,
    pub priority: Priority,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub created_by: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub discipline: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<i32>,
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub discipline: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
}

/// Optional query-string filters for task listings.
#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct TaskFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<Uuid>,
}

impl Task {
    async fn from_model<C: ConnectionTrait>(db: &C, model: task::Model) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let assigned_to = match model.assigned_to {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        let created_by = match model.created_by {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            task_code: model.task_code,
            name: model.name,
            description: model.description,
            assigned_to,
            discipline: model.discipline,
            start_date: model.start_date,
            end_date: model.end_date,
            progress: model.progress,
            status: model.status,
            priority: model.priority,
            estimated_hours: model.estimated_hours,
            actual_hours: model.actual_hours,
            created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        task::Entity::find().count(db).await
    }

    pub async fn count_by_status<C: ConnectionTrait>(
        db: &C,
        status: TaskStatus,
    ) -> Result<u64, DbErr> {
        task::Entity::find()
            .filter(task::Column::Status.eq(status))
            .count(db)
            .await
    }

    /// Tasks past their end date that never reached a terminal status.
    pub async fn count_overdue<C: ConnectionTrait>(db: &C, today: NaiveDate) -> Result<u64, DbErr> {
        task::Entity::find()
            .filter(task::Column::EndDate.lt(today))
            .filter(task::Column::Status.is_not_in([TaskStatus::Completed, TaskStatus::Cancelled]))
            .count(db)
            .await
    }

    /// Open tasks whose end date falls in the given window, soonest first.
    pub async fn find_due_between<C: ConnectionTrait>(
        db: &C,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Self>, DbErr> {
        let records = task::Entity::find()
            .filter(task::Column::EndDate.between(from, to))
            .filter(task::Column::Status.is_not_in([TaskStatus::Completed, TaskStatus::Cancelled]))
            .order_by_asc(task::Column::EndDate)
            .all(db)
            .await?;
        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            tasks.push(Self::from_model(db, record).await?);
        }
        Ok(tasks)
    }

    pub async fn find_with_filter<C: ConnectionTrait>(
        db: &C,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, TaskError> {
        let mut query = task::Entity::find().order_by_desc(task::Column::CreatedAt);
        if let Some(project_uuid) = filter.project_id {
            let project_row_id = ids::project_id_by_uuid(db, project_uuid)
                .await?
                .ok_or(TaskError::ProjectNotFound)?;
            query = query.filter(task::Column::ProjectId.eq(project_row_id));
        }
        if let Some(status) = filter.status.clone() {
            query = query.filter(task::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority.clone() {
            query = query.filter(task::Column::Priority.eq(priority));
        }
        if let Some(user_uuid) = filter.assigned_to {
            let Some(user_row_id) = ids::user_id_by_uuid(db, user_uuid).await? else {
                return Ok(Vec::new());
            };
            query = query.filter(task::Column::AssignedTo.eq(user_row_id));
        }
        let records = query.all(db).await?;
        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            tasks.push(Self::from_model(db, record).await?);
        }
        Ok(tasks)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(record) => Ok(Some(Self::from_model(db, record).await?)),
            None => Ok(None),
        }
    }

    async fn next_task_code<C: ConnectionTrait>(db: &C) -> Result<String, DbErr> {
        let mut n = task::Entity::find().count(db).await? + 1;
        loop {
            let candidate = format!("TASK-{n:04}");
            let taken = task::Entity::find()
                .filter(task::Column::TaskCode.eq(candidate.clone()))
                .count(db)
                .await?;
            if taken == 0 {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        created_by: Option<Uuid>,
    ) -> Result<Self, TaskError> {
        if data.name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(TaskError::ProjectNotFound)?;
        let assigned_to = match data.assigned_to {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let created_by = match created_by {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let code = Self::next_task_code(db).await?;
        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_id: Set(project_row_id),
            task_code: Set(code),
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            assigned_to: Set(assigned_to),
            discipline: Set(data.discipline.clone()),
            start_date: Set(data.start_date),
            end_date: Set(data.end_date),
            progress: Set(clamp_progress(data.progress.unwrap_or(0))),
            status: Set(data.status.clone().unwrap_or_default()),
            priority: Set(data.priority.clone().unwrap_or_default()),
            estimated_hours: Set(data.estimated_hours),
            actual_hours: Set(None),
            created_by: Set(created_by),
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
        payload: &UpdateTask,
    ) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        let mut active: task::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            if name.trim().is_empty() {
                return Err(TaskError::EmptyName);
            }
            active.name = Set(name);
        }
        if payload.description.is_some() {
            active.description = Set(payload.description.clone());
        }
        if let Some(uuid) = payload.assigned_to {
            active.assigned_to = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        if payload.discipline.is_some() {
            active.discipline = Set(payload.discipline.clone());
        }
        if payload.start_date.is_some() {
            active.start_date = Set(payload.start_date);
        }
        if payload.end_date.is_some() {
            active.end_date = Set(payload.end_date);
        }
        if let Some(status) = payload.status.clone() {
            // Finishing a task implies full progress.
            if status == TaskStatus::Completed {
                active.progress = Set(100);
            }
            active.status = Set(status);
        }
        if let Some(priority) = payload.priority.clone() {
            active.priority = Set(priority);
        }
        if let Some(progress) = payload.progress {
            active.progress = Set(clamp_progress(progress));
        }
        if payload.estimated_hours.is_some() {
            active.estimated_hours = Set(payload.estimated_hours);
        }
        if payload.actual_hours.is_some() {
            active.actual_hours = Set(payload.actual_hours);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), TaskError> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TaskError::TaskNotFound);
        }
        Ok(())
    }

    pub async fn average_progress<C: ConnectionTrait>(db: &C) -> Result<f64, DbErr> {
        let values: Vec<i32> = task::Entity::find()
            .select_only()
            .column(task::Column::Progress)
            .into_tuple()
            .all(db)
            .await?;
        if values.is_empty() {
            return Ok(0.0);
        }
        Ok(values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64)
    }
}
