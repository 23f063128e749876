use std::time::Duration;

use chrono::{Datelike, Local, Timelike, Weekday};
use sea_orm::DatabaseConnection;

use super::{assistant::AssistantService, config::AutomationConfig};

/// Hourly scheduler for the standing reports: the director report fires
/// once a day and the team efficiency report on Friday evenings.
pub async fn run_scheduler(
    db: DatabaseConnection,
    assistant: AssistantService,
    config: AutomationConfig,
) {
    loop {
        tokio::time::sleep(Duration::from_secs(60 * 60)).await;

        if !config.enabled {
            continue;
        }
        if !assistant.is_configured() {
            tracing::debug!("Assistant not configured, skipping scheduled reports");
            continue;
        }

        let now = Local::now();
        if now.hour() == config.daily_report_hour {
            tracing::info!("Generating scheduled director report");
            if let Err(err) = assistant.director_report(&db).await {
                tracing::error!("Scheduled director report failed: {}", err);
            }
        }
        if now.weekday() == Weekday::Fri && now.hour() == config.weekly_report_hour {
            tracing::info!("Generating scheduled team efficiency report");
            if let Err(err) = assistant.team_efficiency(&db).await {
                tracing::error!("Scheduled team efficiency report failed: {}", err);
            }
        }
    }
}
