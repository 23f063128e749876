use db::models::{
    company::Company,
    session::Session,
    user::{CreateUser, User, UserError, UserRole},
};
use sea_orm::{ConnectionTrait, DbErr};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_ADMIN_EMAIL: &str = "director@datumauto.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Verify credentials and open a session for the user.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<(Session, User), AuthError> {
    let Some((user, hash)) = User::credentials_by_email(db, email).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !bcrypt::verify(password, &hash)? {
        return Err(AuthError::InvalidCredentials);
    }
    let session = Session::create(db, user.id).await?;
    Ok((session, user))
}

pub async fn logout<C: ConnectionTrait>(db: &C, token: Uuid) -> Result<bool, DbErr> {
    Session::delete(db, token).await
}

/// Seed a director account on an empty database so the dashboard is
/// reachable on first launch.
pub async fn bootstrap_admin<C: ConnectionTrait>(db: &C, company_name: &str) -> Result<(), AuthError> {
    if User::count(db).await? > 0 {
        return Ok(());
    }
    let company = Company::find_or_create_default(db, company_name).await?;
    let password_hash = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
    User::create(
        db,
        company.id,
        &CreateUser {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password_hash,
            first_name: "BIM".to_string(),
            last_name: "Director".to_string(),
            role: UserRole::Director,
            department: Some("Management".to_string()),
            phone: None,
        },
    )
    .await?;
    tracing::warn!(
        "Seeded default director account {}; change its password after first login",
        DEFAULT_ADMIN_EMAIL
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use db::Migrator;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn test_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn bootstrap_then_login() {
        let db = test_db().await;
        bootstrap_admin(&db, "Datumauto").await.unwrap();
        // Second run is a no-op.
        bootstrap_admin(&db, "Datumauto").await.unwrap();
        assert_eq!(User::count(&db).await.unwrap(), 1);

        let (session, user) = login(&db, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Director);
        assert!(session.expires_at > session.created_at);

        let resolved = Session::find_user_by_token(&db, session.id).await.unwrap();
        assert_eq!(resolved.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let db = test_db().await;
        bootstrap_admin(&db, "Datumauto").await.unwrap();
        let err = login(&db, DEFAULT_ADMIN_EMAIL, "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let db = test_db().await;
        bootstrap_admin(&db, "Datumauto").await.unwrap();
        let (session, _) = login(&db, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(logout(&db, session.id).await.unwrap());
        let resolved = Session::find_user_by_token(&db, session.id).await.unwrap();
        assert!(resolved.is_none());
    }
}
