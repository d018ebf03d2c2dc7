use mailbridge_persistence_postgres::{PostgresDatabase, PostgresDatabaseConfig};

pub type Db = PostgresDatabase;

pub async fn setup() -> Db {
    let db = setup_clean().await;
    db.run_migrations(None).await.unwrap();
    db
}

pub async fn setup_clean() -> Db {
    let config = mailbridge_config::load()
        .unwrap()
        .store
        .expect("the store section must be configured to run database tests")
        .database;

    let db = Db::connect(&PostgresDatabaseConfig {
        host: config.host,
        port: config.port,
        user: config.user,
        password: config.password.expose().into(),
        name: config.name,
        max_connections: config.max_connections,
        min_connections: config.min_connections,
        acquire_timeout: config.acquire_timeout.into(),
        idle_timeout: config.idle_timeout.map(Into::into),
        max_lifetime: config.max_lifetime.map(Into::into),
    })
    .await
    .unwrap();

    db.reset().await.unwrap();
    db
}
