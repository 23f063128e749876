use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::BimFileStatus;
use crate::{entities::bim_file, models::ids};

#[derive(Debug, Error)]
pub enum BimFileError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("File not found")]
    FileNotFound,
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BimFile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub version: Option<String>,
    pub lod_level: Option<String>,
    pub discipline: Option<String>,
    pub status: BimFileStatus,
    pub uploaded_by: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateBimFile {
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub version: Option<String>,
    pub lod_level: Option<String>,
    pub discipline: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateBimFile {
    pub version: Option<String>,
    pub lod_level: Option<String>,
    pub discipline: Option<String>,
    pub status: Option<BimFileStatus>,
}

impl BimFile {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: bim_file::Model,
    ) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let uploaded_by = match model.uploaded_by {
            Some(id) => ids::user_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            file_name: model.file_name,
            file_type: model.file_type,
            file_path: model.file_path,
            file_size: model.file_size,
            version: model.version,
            lod_level: model.lod_level,
            discipline: model.discipline,
            status: model.status,
            uploaded_by,
            created_at: model.created_at,
        })
    }

    pub async fn find_by_project<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, BimFileError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(BimFileError::ProjectNotFound)?;
        let records = bim_file::Entity::find()
            .filter(bim_file::Column::ProjectId.eq(project_row_id))
            .order_by_desc(bim_file::Column::CreatedAt)
            .all(db)
            .await?;
        let mut files = Vec::with_capacity(records.len());
        for record in records {
            files.push(Self::from_model(db, record).await?);
        }
        Ok(files)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = bim_file::Entity::find()
            .filter(bim_file::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(record) => Ok(Some(Self::from_model(db, record).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        data: &CreateBimFile,
        uploaded_by: Option<Uuid>,
    ) -> Result<Self, BimFileError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(BimFileError::ProjectNotFound)?;
        let uploaded_by = match uploaded_by {
            Some(uuid) => ids::user_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let active = bim_file::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            project_id: Set(project_row_id),
            file_name: Set(data.file_name.clone()),
            file_type: Set(data.file_type.clone()),
            file_path: Set(data.file_path.clone()),
            file_size: Set(data.file_size),
            version: Set(data.version.clone()),
            lod_level: Set(data.lod_level.clone()),
            discipline: Set(data.discipline.clone()),
            status: Set(BimFileStatus::Uploaded),
            uploaded_by: Set(uploaded_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateBimFile,
    ) -> Result<Self, BimFileError> {
        let record = bim_file::Entity::find()
            .filter(bim_file::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(BimFileError::FileNotFound)?;

        let mut active: bim_file::ActiveModel = record.into();
        if payload.version.is_some() {
            active.version = Set(payload.version.clone());
        }
        if payload.lod_level.is_some() {
            active.lod_level = Set(payload.lod_level.clone());
        }
        if payload.discipline.is_some() {
            active.discipline = Set(payload.discipline.clone());
        }
        if let Some(status) = payload.status.clone() {
            active.status = Set(status);
        }

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), BimFileError> {
        let result = bim_file::Entity::delete_many()
            .filter(bim_file::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(BimFileError::FileNotFound);
        }
        Ok(())
    }
}
