use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{user, user_session},
    models::{ids, user::User},
};

/// Sessions live 24 hours; the token handed to the client is the row uuid.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: user_session::Model,
    ) -> Result<Self, DbErr> {
        let user_uuid = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            user_id: user_uuid,
            created_at: model.created_at,
            expires_at: model.expires_at,
        })
    }

    pub async fn create<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Self, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let now = Utc::now();
        let active = user_session::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            user_id: Set(user_row_id),
            created_at: Set(now),
            expires_at: Set(now + Duration::hours(SESSION_TTL_HOURS)),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    /// Resolve a presented token to its user, rejecting expired sessions.
    pub async fn find_user_by_token<C: ConnectionTrait>(
        db: &C,
        token: Uuid,
    ) -> Result<Option<User>, DbErr> {
        let record = user_session::Entity::find()
            .filter(user_session::Column::Uuid.eq(token))
            .one(db)
            .await?;
        let Some(record) = record else {
            return Ok(None);
        };
        if record.expires_at <= Utc::now() {
            return Ok(None);
        }
        let user = user::Entity::find()
            .filter(user::Column::Id.eq(record.user_id))
            .filter(user::Column::IsActive.eq(true))
            .one(db)
            .await?;
        Ok(user.map(User::from_model))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, token: Uuid) -> Result<bool, DbErr> {
        let result = user_session::Entity::delete_many()
            .filter(user_session::Column::Uuid.eq(token))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn prune_expired<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let result = user_session::Entity::delete_many()
            .filter(user_session::Column::ExpiresAt.lte(Utc::now()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
