use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use utils::assets::asset_dir;

pub mod entities;
pub mod models;
pub mod types;

pub use db_migration::Migrator;

#[derive(Clone)]
pub struct DBService {
    pub pool: DatabaseConnection,
}

fn database_url() -> Result<String, DbErr> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }
    let dir = asset_dir();
    std::fs::create_dir_all(&dir).map_err(|err| DbErr::Custom(err.to_string()))?;
    Ok(format!(
        "sqlite://{}?mode=rwc",
        dir.join("bim.sqlite").to_string_lossy()
    ))
}

impl DBService {
    pub async fn new() -> Result<DBService, DbErr> {
        let database_url = database_url()?;
        let mut options = ConnectOptions::new(database_url);
        options
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .sqlx_logging(false);
        let pool = Database::connect(options).await?;
        Migrator::up(&pool, None).await?;
        Ok(DBService { pool })
    }
}
