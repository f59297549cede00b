use std::sync::Arc;

use engine::{EmailSender, EnginePolicy, NoopEmailSender};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("engine error: {0}")]
    Engine(#[from] engine::EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "reimburse={level},server={level},engine={level},mailer={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;

    let engine = engine::Engine::builder()
        .database(db)
        .email_sender(email_sender(settings.mailer))
        .policy(EnginePolicy {
            expense_date_grace_days: settings.engine.expense_date_grace_days,
        })
        .build()
        .await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

fn email_sender(config: Option<mailer::MailerConfig>) -> Arc<dyn EmailSender> {
    let Some(config) = config else {
        tracing::info!("no [mailer] settings, email delivery disabled");
        return Arc::new(NoopEmailSender);
    };

    match mailer::HttpMailer::new(config) {
        Ok(mailer) => Arc::new(mailer),
        Err(err) => {
            tracing::warn!("invalid mailer settings, email delivery disabled: {err}");
            Arc::new(NoopEmailSender)
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, AppError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
