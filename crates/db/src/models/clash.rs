use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::{ClashSeverity, ClashStatus};
use crate::{entities::clash_detection, models::ids};

#[derive(Debug, Error)]
pub enum ClashError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Clash not found")]
    ClashNotFound,
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Clash {
    pub id: Uuid,
    pub project_id: Uuid,
    pub clash_code: String,
    pub description: String,
    pub discipline_1: Option<String>,
    pub discipline_2: Option<String>,
    pub severity: ClashSeverity,
    pub status: ClashStatus,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_date: Option<NaiveDate>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateClash {
    pub description: String,
    pub discipline_1: Option<String>,
    pub discipline_2: Option<String>,
    pub severity: Option<ClashSeverity>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateClash {
    pub description: Option<String>,
    pub severity: Option<ClashSeverity>,
    pub status: Option<ClashStatus>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
}

impl Clash {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: clash_detection::Model,
    ) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let assigned_to = match model.assigned_to {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        let resolved_by = match model.resolved_by {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            clash_code: model.clash_code,
            description: model.description,
            discipline_1: model.discipline_1,
            discipline_2: model.discipline_2,
            severity: model.severity,
            status: model.status,
            assigned_to,
            due_date: model.due_date,
            resolution: model.resolution,
            resolved_by,
            resolved_date: model.resolved_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub async fn count_open<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        clash_detection::Entity::find()
            .filter(
                clash_detection::Column::Status
                    .is_not_in([ClashStatus::Resolved, ClashStatus::Closed]),
            )
            .count(db)
            .await
    }

    pub async fn find_by_project<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, ClashError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(ClashError::ProjectNotFound)?;
        let records = clash_detection::Entity::find()
            .filter(clash_detection::Column::ProjectId.eq(project_row_id))
            .order_by_desc(clash_detection::Column::CreatedAt)
            .all(db)
            .await?;
        let mut clashes = Vec::with_capacity(records.len());
        for record in records {
            clashes.push(Self::from_model(db, record).await?);
        }
        Ok(clashes)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = clash_detection::Entity::find()
            .filter(clash_detection::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(record) => Ok(Some(Self::from_model(db, record).await?)),
            None => Ok(None),
        }
    }

    async fn next_clash_code<C: ConnectionTrait>(db: &C) -> Result<String, DbErr> {
        let mut n = clash_detection::Entity::find().count(db).await? + 1;
        loop {
            let candidate = format!("CLH-{n:04}");
            let taken = clash_detection::Entity::find()
                .filter(clash_detection::Column::ClashCode.eq(candidate.clone()))
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
        project_id: Uuid,
        data: &CreateClash,
    ) -> Result<Self, ClashError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(ClashError::ProjectNotFound)?;
        let assigned_to = match data.assigned_to {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let status = if assigned_to.is_some() {
            ClashStatus::Assigned
        } else {
            ClashStatus::Open
        };
        let code = Self::next_clash_code(db).await?;
        let now = Utc::now();
        let active = clash_detection::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_id: Set(project_row_id),
            clash_code: Set(code),
            description: Set(data.description.clone()),
            discipline_1: Set(data.discipline_1.clone()),
            discipline_2: Set(data.discipline_2.clone()),
            severity: Set(data.severity.clone().unwrap_or_default()),
            status: Set(status),
            assigned_to: Set(assigned_to),
            due_date: Set(data.due_date),
            resolution: Set(None),
            resolved_by: Set(None),
            resolved_date: Set(None),
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
        payload: &UpdateClash,
    ) -> Result<Self, ClashError> {
        let record = clash_detection::Entity::find()
            .filter(clash_detection::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(ClashError::ClashNotFound)?;

        let mut active: clash_detection::ActiveModel = record.into();
        if let Some(description) = payload.description.clone() {
            active.description = Set(description);
        }
        if let Some(severity) = payload.severity.clone() {
            active.severity = Set(severity);
        }
        if let Some(uuid) = payload.assigned_to {
            active.assigned_to = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        if payload.due_date.is_some() {
            active.due_date = Set(payload.due_date);
        }
        if payload.resolution.is_some() {
            active.resolution = Set(payload.resolution.clone());
        }
        if let Some(uuid) = payload.resolved_by {
            active.resolved_by = Set(ids::user_id_by_uuid(db, uuid).await?);
        }
        if let Some(status) = payload.status.clone() {
            // Moving into resolved stamps the resolution date.
            if status == ClashStatus::Resolved {
                active.resolved_date = Set(Some(Utc::now().date_naive()));
            }
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ClashError> {
        let result = clash_detection::Entity::delete_many()
            .filter(clash_detection::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ClashError::ClashNotFound);
        }
        Ok(())
    }
}
