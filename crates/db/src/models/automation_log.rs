use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub use crate::types::AutomationStatus;
use crate::{entities::automation_log, models::ids};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AutomationLog {
    pub id: Uuid,
    pub action_type: String,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: AutomationStatus,
    pub result: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

impl AutomationLog {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: automation_log::Model,
    ) -> Result<Self, DbErr> {
        let project_id = match model.project_id {
            Some(id) => ids::project_uuid_by_id(db, id).await?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            action_type: model.action_type,
            project_id,
            description: model.description,
            status: model.status,
            result: model.result,
            created_at: model.created_at,
        })
    }

    pub async fn record<C: ConnectionTrait>(
        db: &C,
        action_type: &str,
        project_id: Option<Uuid>,
        description: Option<String>,
        status: AutomationStatus,
        result: Option<String>,
    ) -> Result<Self, DbErr> {
        let project_row_id = match project_id {
            Some(uuid) => ids::project_id_by_uuid(db, uuid).await?,
            None => None,
        };
        let active = automation_log::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            action_type: Set(action_type.to_string()),
            project_id: Set(project_row_id),
            description: Set(description),
            status: Set(status),
            result: Set(result),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn find_recent<C: ConnectionTrait>(db: &C, limit: u64) -> Result<Vec<Self>, DbErr> {
        let records = automation_log::Entity::find()
            .order_by_desc(automation_log::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?;
        let mut logs = Vec::with_capacity(records.len());
        for record in records {
            logs.push(Self::from_model(db, record).await?);
        }
        Ok(logs)
    }
}
