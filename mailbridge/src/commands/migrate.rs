use anyhow::Context;
use clap::Subcommand;
use mailbridge_config::Config;
use mailbridge_persistence_postgres::{MigrationStatus, PostgresDatabase};

use crate::database;

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// List all pending and applied migrations
    #[command(aliases(["status", "l"]))]
    List,
    /// Apply pending migrations
    #[command(aliases(["up", "u"]))]
    Run {
        /// Only apply the next `count` migrations
        count: Option<usize>,
    },
    /// Revert applied migrations
    #[command(aliases(["down", "d"]))]
    Revert {
        /// Number of migrations to revert
        #[arg(default_value = "1")]
        count: usize,
        #[arg(long, required = true)]
        force: bool,
    },
    /// Reset the database and delete all data
    Reset {
        #[arg(long, required = true)]
        force: bool,
    },
}

impl MigrateCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let database_config = &config
            .store
            .as_ref()
            .context("The store section is missing from the config")?
            .database;
        let db = database::connect(database_config).await?;

        match self {
            Self::List => list(db).await,
            Self::Run { count } => run(db, count).await,
            Self::Revert { count, force: _ } => revert(db, count).await,
            Self::Reset { force: _ } => reset(db).await,
        }
    }
}

async fn list(db: PostgresDatabase) -> anyhow::Result<()> {
    for MigrationStatus { migration, applied } in db.list_migrations().await? {
        let state = if applied { "applied" } else { "pending" };
        println!("[{state}] {}", migration.name);
    }

    Ok(())
}

async fn run(db: PostgresDatabase, count: Option<usize>) -> anyhow::Result<()> {
    print_migrations(&db.run_migrations(count).await?, "applied");
    Ok(())
}

async fn revert(db: PostgresDatabase, count: usize) -> anyhow::Result<()> {
    print_migrations(&db.revert_migrations(Some(count)).await?, "reverted");
    Ok(())
}

async fn reset(db: PostgresDatabase) -> anyhow::Result<()> {
    db.reset().await?;
    println!("Database reset successful");
    Ok(())
}

fn print_migrations(names: &[&str], action: &str) {
    if names.is_empty() {
        println!("No migrations {action}");
    }
    for name in names {
        println!("[{action}] {name}");
    }
}
