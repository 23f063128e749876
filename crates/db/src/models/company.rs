use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::entities::company;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub timezone: String,
    pub currency: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

impl Company {
    fn from_model(model: company::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            timezone: model.timezone,
            currency: model.currency,
            created_at: model.created_at,
        }
    }

    /// The first company row is the tenant everything else hangs off.
    pub async fn find_default<C: ConnectionTrait>(db: &C) -> Result<Option<Self>, DbErr> {
        let record = company::Entity::find()
            .order_by_asc(company::Column::Id)
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn find_or_create_default<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Self, DbErr> {
        if let Some(existing) = Self::find_default(db).await? {
            return Ok(existing);
        }
        let active = company::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(None),
            phone: Set(None),
            address: Set(None),
            timezone: Set("Asia/Dubai".to_string()),
            currency: Set("AED".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }
}
