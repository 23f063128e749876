use std::sync::Arc;

use db::DBService;
use services::services::{
    assistant::AssistantService,
    auth::AuthError,
    config::{load_config_from_file, save_config_to_file, Config, ConfigError},
};
use thiserror::Error;
use tokio::sync::RwLock;
use utils::assets::config_path;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Everything the HTTP layer needs, wired together once at startup.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
    config: Arc<RwLock<Config>>,
    assistant: AssistantService,
}

impl Deployment {
    pub async fn new() -> Result<Self, DeploymentError> {
        let config_path = config_path();
        let config = load_config_from_file(&config_path).await;
        save_config_to_file(&config, &config_path).await?;

        let db = DBService::new().await?;
        services::services::auth::bootstrap_admin(&db.pool, &config.company_name).await?;

        let assistant = AssistantService::new(config.assistant.clone());
        tracing::info!(
            company = %config.company_name,
            assistant_configured = assistant.is_configured(),
            "Deployment ready"
        );
        Ok(Self {
            db,
            config: Arc::new(RwLock::new(config)),
            assistant,
        })
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}
