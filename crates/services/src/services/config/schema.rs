use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const CURRENT_CONFIG_VERSION: &str = "v2";

fn default_config_version() -> String {
    CURRENT_CONFIG_VERSION.to_string()
}

fn default_company_name() -> String {
    "Datumauto".to_string()
}

fn default_assistant_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_assistant_model() -> String {
    "deepseek-chat".to_string()
}

fn default_daily_report_hour() -> u32 {
    8
}

fn default_weekly_report_hour() -> u32 {
    18
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct AssistantConfig {
    /// Falls back to the DEEPSEEK_API_KEY environment variable when unset.
    #[serde(alias = "apiKey")]
    pub api_key: Option<String>,
    #[serde(alias = "baseUrl")]
    pub base_url: String,
    pub model: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_assistant_base_url(),
            model: default_assistant_model(),
        }
    }
}

impl AssistantConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct AutomationConfig {
    pub enabled: bool,
    /// Hour of day (local time) for the daily director report.
    #[serde(alias = "dailyReportHour")]
    pub daily_report_hour: u32,
    /// Hour of day on Fridays for the team efficiency report.
    #[serde(alias = "weeklyReportHour")]
    pub weekly_report_hour: u32,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_report_hour: default_daily_report_hour(),
            weekly_report_hour: default_weekly_report_hour(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "configVersion")]
    pub config_version: String,
    #[serde(alias = "companyName")]
    pub company_name: String,
    pub assistant: AssistantConfig,
    pub automation: AutomationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            company_name: default_company_name(),
            assistant: AssistantConfig::default(),
            automation: AutomationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_raw(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(config) if config.config_version == CURRENT_CONFIG_VERSION => config,
            Ok(config) => {
                tracing::warn!(
                    "Config version {} does not match {}, resetting to defaults",
                    config.config_version,
                    CURRENT_CONFIG_VERSION
                );
                Self::default()
            }
            Err(err) => {
                tracing::warn!("Failed to parse config file, resetting to defaults: {}", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_raw_falls_back_to_defaults() {
        let config = Config::from_raw("not json");
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.automation.daily_report_hour, 8);
    }

    #[test]
    fn version_mismatch_resets() {
        let raw = r#"{"config_version":"v1","company_name":"Other"}"#;
        let config = Config::from_raw(raw);
        assert_eq!(config.company_name, "Datumauto");
    }

    #[test]
    fn matching_version_round_trips() {
        let mut config = Config::default();
        config.company_name = "Acme BIM".to_string();
        let raw = serde_json::to_string(&config).unwrap();
        let parsed = Config::from_raw(&raw);
        assert_eq!(parsed.company_name, "Acme BIM");
    }
}
