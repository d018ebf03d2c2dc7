use std::{collections::HashSet, fmt, time::Duration};

use anyhow::{anyhow, Context};
use bb8::{Pool, PooledConnection};
use bb8_postgres::{
    tokio_postgres::{self, NoTls},
    PostgresConnectionManager,
};
use mailbridge_persistence_contracts::{Database, Transaction};
use ouroboros::self_referencing;
use tracing::{debug, instrument, trace};

pub mod contact;

type PgClient = tokio_postgres::Client;
type PgPooledConnection = PooledConnection<'static, PostgresConnectionManager<NoTls>>;
type PgTransaction<'a> = tokio_postgres::Transaction<'a>;

#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

#[derive(Debug)]
pub struct PostgresDatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Also used as the timeout for establishing new connections.
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl PostgresDatabase {
    pub async fn connect(config: &PostgresDatabaseConfig) -> anyhow::Result<Self> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.name)
            .connect_timeout(config.acquire_timeout);

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(config.min_connections)
            .connection_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .build(PostgresConnectionManager::new(pg_config, NoTls))
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to database {} on {}:{}",
                    config.name, config.host, config.port
                )
            })?;

        Ok(Self { pool })
    }

    #[cfg(feature = "dummy")]
    pub fn dummy() -> Self {
        let manager = PostgresConnectionManager::new(tokio_postgres::Config::new(), NoTls);
        Self {
            pool: Pool::builder().build_unchecked(manager),
        }
    }

    pub async fn list_migrations(&self) -> anyhow::Result<Vec<MigrationStatus>> {
        let conn = self.connection().await?;
        create_migrations_table(&conn)
            .await
            .context("Failed to create migrations table")?;
        list_migrations(&conn)
            .await
            .context("Failed to list migrations")
    }

    /// Apply the first `cnt` pending migrations (or all of them).
    pub async fn run_migrations(&self, cnt: Option<usize>) -> anyhow::Result<Vec<&'static str>> {
        self.migrate(Direction::Up, cnt).await
    }

    /// Revert the last `cnt` applied migrations (or all of them).
    pub async fn revert_migrations(&self, cnt: Option<usize>) -> anyhow::Result<Vec<&'static str>> {
        self.migrate(Direction::Down, cnt).await
    }

    pub async fn reset(&self) -> anyhow::Result<()> {
        self.connection()
            .await?
            .batch_execute("drop schema public cascade; create schema public;")
            .await
            .context("Failed to drop and recreate schema public")
    }

    async fn migrate(
        &self,
        direction: Direction,
        cnt: Option<usize>,
    ) -> anyhow::Result<Vec<&'static str>> {
        let mut conn = self.connection().await?;
        create_migrations_table(&conn)
            .await
            .context("Failed to create migrations table")?;

        let statuses = list_migrations(&conn)
            .await
            .context("Failed to list migrations")?;
        let selected = match direction {
            Direction::Up => statuses
                .into_iter()
                .filter(|status| !status.applied)
                .map(|status| status.migration)
                .take(cnt.unwrap_or(usize::MAX))
                .collect::<Vec<_>>(),
            Direction::Down => statuses
                .into_iter()
                .rev()
                .filter(|status| status.applied)
                .map(|status| status.migration)
                .take(cnt.unwrap_or(usize::MAX))
                .collect(),
        };

        let mut out = Vec::with_capacity(selected.len());
        for migration in selected {
            let (script, bookkeeping) = match direction {
                Direction::Up => (migration.up, "insert into _migrations (name) values ($1)"),
                Direction::Down => (migration.down, "delete from _migrations where name=$1"),
            };

            let txn = conn
                .transaction()
                .await
                .context("Failed to begin transaction")?;
            txn.batch_execute(script)
                .await
                .with_context(|| format!("Failed to {direction} migration {}", migration.name))?;
            txn.execute(bookkeeping, &[&migration.name])
                .await
                .with_context(|| {
                    format!("Failed to record {direction} of migration {}", migration.name)
                })?;
            txn.commit().await.context("Failed to commit transaction")?;

            debug!(migration = migration.name, %direction, "migration finished");
            out.push(migration.name);
        }

        Ok(out)
    }

    async fn connection(
        &self,
    ) -> anyhow::Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>> {
        self.pool
            .get()
            .await
            .context("Failed to acquire database connection")
    }
}

impl Database for PostgresDatabase {
    type Transaction = PostgresTransaction;

    async fn begin_transaction(&self) -> anyhow::Result<Self::Transaction> {
        trace!("begin transaction");

        let conn = self
            .pool
            .get_owned()
            .await
            .context("Failed to acquire database connection")?;

        PostgresTransactionAsyncSendTryBuilder {
            conn,
            txn_builder: |conn| Box::pin(async move { conn.transaction().await.map(Some) }),
        }
        .try_build()
        .await
        .context("Failed to begin transaction")
    }

    #[instrument(level = "trace", skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let res: i32 = self
            .connection()
            .await?
            .query_one("select 1", &[])
            .await
            .context("Failed to ping database")?
            .get(0);

        (res == 1)
            .then_some(())
            .ok_or_else(|| anyhow!("Expected a result of 1 when pinging the database, got {res}"))
    }
}

/// A database transaction that owns its pooled connection.
///
/// Dropping it without calling [`Transaction::commit()`] rolls back all
/// changes and hands the connection back to the pool.
#[self_referencing]
pub struct PostgresTransaction {
    conn: PgPooledConnection,
    #[borrows(mut conn)]
    #[covariant]
    txn: Option<PgTransaction<'this>>,
}

impl PostgresTransaction {
    // `None` only after `commit` or `rollback`, both of which consume `self`.
    fn txn(&self) -> &PgTransaction<'_> {
        self.borrow_txn().as_ref().unwrap()
    }
}

impl Transaction for PostgresTransaction {
    async fn commit(mut self) -> anyhow::Result<()> {
        trace!("commit transaction");

        self.with_txn_mut(|txn| txn.take())
            .unwrap()
            .commit()
            .await
            .context("Failed to commit transaction")
    }

    async fn rollback(mut self) -> anyhow::Result<()> {
        trace!("rollback transaction");

        self.with_txn_mut(|txn| txn.take())
            .unwrap()
            .rollback()
            .await
            .context("Failed to rollback transaction")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MigrationStatus {
    pub migration: Migration,
    pub applied: bool,
}

// generated by `build.rs` script
pub const MIGRATIONS: &[Migration] = include!(env!("MIGRATIONS"));

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "run",
            Self::Down => "revert",
        })
    }
}

async fn create_migrations_table(conn: &PgClient) -> anyhow::Result<()> {
    conn.execute(
        "create table if not exists _migrations (name text primary key);",
        &[],
    )
    .await?;
    Ok(())
}

async fn list_migrations(conn: &PgClient) -> anyhow::Result<Vec<MigrationStatus>> {
    let applied = conn
        .query("select name from _migrations;", &[])
        .await?
        .into_iter()
        .map(|row| row.get(0))
        .collect::<HashSet<String>>();

    Ok(MIGRATIONS
        .iter()
        .map(|&migration| MigrationStatus {
            migration,
            applied: applied.contains(migration.name),
        })
        .collect())
}

macro_rules! columns {
    ($vis:vis $ident:ident as $alias:literal: $fst:literal $(, $col:literal)* $(,)?) => {
        ::paste::paste! {
            #[allow(unused, reason = "not every table needs all variants")]
            $vis const [< $ident:snake:upper _CNT >]: usize = [ $fst $(, $col)* ].len();
            #[allow(unused, reason = "not every table needs all variants")]
            $vis const [< $ident:snake:upper _COLS >]: &str = ::core::concat!( '"', $alias, "\".\"", $fst, '"' $(, ", \"" , $alias, "\".\"", $col, '"' )* );
            #[allow(unused, reason = "not every table needs all variants")]
            $vis const [< $ident:snake:upper _COL_NAMES >]: &str = ::core::concat!( '"', $fst, '"' $(, ", \"", $col, '"' )* );
        }
    };
}
use columns;

fn arg_indices(indices: impl IntoIterator<Item = usize>) -> String {
    indices
        .into_iter()
        .map(|idx| format!("${idx}"))
        .collect::<Vec<_>>()
        .join(", ")
}
