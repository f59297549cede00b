//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and overridden by `REIMBURSE__*` environment
//! variables (e.g. `REIMBURSE__SERVER__PORT=8080`).
use config::{Config, ConfigError, Environment, File};
use mailer::MailerConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineSettings {
    /// Reject expense dates later than today + this many days.
    pub expense_date_grace_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub engine: EngineSettings,
    pub mailer: Option<MailerConfig>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("REIMBURSE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn full_settings_parse() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "reimburse.db" }

            [engine]
            expense_date_grace_days = 0

            [mailer]
            base_url = "https://api.resend.com"
            api_key = "re_123"
            from = "noreply@uni.example"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref p) if p == "reimburse.db"));
        assert_eq!(settings.engine.expense_date_grace_days, Some(0));
        assert_eq!(settings.mailer.unwrap().timeout_secs, 10);
    }

    #[test]
    fn sections_are_optional() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert!(settings.mailer.is_none());
        assert_eq!(settings.engine.expense_date_grace_days, None);
    }
}
