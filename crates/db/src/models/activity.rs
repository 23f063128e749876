use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{project, task},
    models::{automation_log::AutomationLog, ids},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Project,
    Task,
    Automation,
}

/// A single line in the recent-activity feed, assembled from the latest
/// project updates, task updates and automation runs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub title: String,
    pub detail: Option<String>,
    pub project_id: Option<Uuid>,
    #[ts(type = "Date")]
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub async fn recent<C: ConnectionTrait>(
        db: &C,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let mut entries = Vec::new();

        let projects = project::Entity::find()
            .order_by_desc(project::Column::UpdatedAt)
            .limit(limit)
            .all(db)
            .await?;
        for record in projects {
            entries.push(Self {
                kind: ActivityKind::Project,
                title: record.name,
                detail: Some(format!("status: {}", record.status)),
                project_id: Some(record.uuid),
                timestamp: record.updated_at,
            });
        }

        let tasks = task::Entity::find()
            .order_by_desc(task::Column::UpdatedAt)
            .limit(limit)
            .all(db)
            .await?;
        for record in tasks {
            let project_uuid = ids::project_uuid_by_id(db, record.project_id).await?;
            entries.push(Self {
                kind: ActivityKind::Task,
                title: record.name,
                detail: Some(format!("{} ({})", record.task_code, record.status)),
                project_id: project_uuid,
                timestamp: record.updated_at,
            });
        }

        for log in AutomationLog::find_recent(db, limit).await? {
            entries.push(Self {
                kind: ActivityKind::Automation,
                title: log.action_type,
                detail: log.description,
                project_id: log.project_id,
                timestamp: log.created_at,
            });
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
