use anyhow::Context;
use clap::Subcommand;
use mailbridge_config::Config;
use mailbridge_email_contracts::EmailService;
use mailbridge_persistence_contracts::Database;
use mailbridge_templates_impl::TemplateServiceImpl;
use tracing::{info, warn};

use crate::{database, email, environment};

#[derive(Debug, Subcommand)]
pub enum ServeCommand {
    /// Forward contact requests to the configured recipient by email
    #[command(aliases(["n"]))]
    Notifier,
    /// Store contact requests in the database
    #[command(aliases(["s"]))]
    Store,
}

impl ServeCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Notifier => notifier(config).await,
            Self::Store => store(config).await,
        }
    }
}

async fn notifier(config: Config) -> anyhow::Result<()> {
    let notifier_config = config
        .notifier
        .as_ref()
        .context("The notifier section is missing from the config")?;

    info!(
        recipient = %notifier_config.recipient_email,
        smtp_host = %notifier_config.smtp.host,
        smtp_port = notifier_config.smtp.port,
        "Configuring smtp transport"
    );
    let email = email::connect(&notifier_config.smtp)?;
    if let Err(err) = email.ping().await {
        warn!("Failed to ping smtp server: {err:#}");
    }

    let template = TemplateServiceImpl::new().context("Failed to load templates")?;

    let server = environment::notifier_server(&config, notifier_config, email, template);
    info!("Starting notifier on {}", config.http.address);
    server.serve().await
}

async fn store(config: Config) -> anyhow::Result<()> {
    let database_config = &config
        .store
        .as_ref()
        .context("The store section is missing from the config")?
        .database;

    info!(
        host = %database_config.host,
        port = database_config.port,
        name = %database_config.name,
        "Connecting to database"
    );
    let database = database::connect(database_config).await?;
    database.ping().await?;

    info!("Applying pending migrations");
    let applied = database.run_migrations(None).await?;
    for name in &applied {
        info!("Applied {name}");
    }
    if applied.is_empty() {
        info!("No migrations pending");
    }

    let server = environment::store_server(&config, database_config, database);
    info!("Starting store on {}", config.http.address);
    server.serve().await
}
