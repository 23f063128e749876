use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::project_kpi, models::ids};

#[derive(Debug, Error)]
pub enum KpiError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Kpi {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kpi_date: NaiveDate,
    pub metric_type: String,
    pub metric_value: f64,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpsertKpi {
    pub kpi_date: NaiveDate,
    pub metric_type: String,
    pub metric_value: f64,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

impl Kpi {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: project_kpi::Model,
    ) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            kpi_date: model.kpi_date,
            metric_type: model.metric_type,
            metric_value: model.metric_value,
            target_value: model.target_value,
            unit: model.unit,
            notes: model.notes,
            created_at: model.created_at,
        })
    }

    pub async fn find_by_project<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, KpiError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(KpiError::ProjectNotFound)?;
        let records = project_kpi::Entity::find()
            .filter(project_kpi::Column::ProjectId.eq(project_row_id))
            .order_by_desc(project_kpi::Column::KpiDate)
            .all(db)
            .await?;
        let mut kpis = Vec::with_capacity(records.len());
        for record in records {
            kpis.push(Self::from_model(db, record).await?);
        }
        Ok(kpis)
    }

    /// One row per (project, date, metric). A second write for the same key
    /// overwrites the recorded value instead of inserting a duplicate.
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        data: &UpsertKpi,
    ) -> Result<Self, KpiError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(KpiError::ProjectNotFound)?;
        let existing = project_kpi::Entity::find()
            .filter(project_kpi::Column::ProjectId.eq(project_row_id))
            .filter(project_kpi::Column::KpiDate.eq(data.kpi_date))
            .filter(project_kpi::Column::MetricType.eq(data.metric_type.clone()))
            .one(db)
            .await?;

        let model = match existing {
            Some(record) => {
                let mut active: project_kpi::ActiveModel = record.into();
                active.metric_value = Set(data.metric_value);
                if data.target_value.is_some() {
                    active.target_value = Set(data.target_value);
                }
                if data.unit.is_some() {
                    active.unit = Set(data.unit.clone());
                }
                if data.notes.is_some() {
                    active.notes = Set(data.notes.clone());
                }
                active.update(db).await?
            }
            None => {
                let active = project_kpi::ActiveModel {
                    uuid: Set(Uuid::new_v4()),
                    project_id: Set(project_row_id),
                    kpi_date: Set(data.kpi_date),
                    metric_type: Set(data.metric_type.clone()),
                    metric_value: Set(data.metric_value),
                    target_value: Set(data.target_value),
                    unit: Set(data.unit.clone()),
                    notes: Set(data.notes.clone()),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                };
                active.insert(db).await?
            }
        };
        Ok(Self::from_model(db, model).await?)
    }
}
