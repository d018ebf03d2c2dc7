//! Wiring of the concrete services for both server variants

use std::sync::Arc;

use mailbridge_api_rest::{ApiInfo, RestServerConfig};
use mailbridge_config::{Config, DatabaseConfig, NotifierConfig, SmtpConfig};
use mailbridge_core_notification_impl::NotificationFeatureConfig;
use types::{
    ContactRequestRepo, Database, Email, Notification, NotifierServer, StoreServer, Submission,
    Template,
};

pub mod types;

pub fn rest_server_config(config: &Config) -> RestServerConfig {
    RestServerConfig {
        address: config.http.address,
        cors_origins: config.http.cors_origins.clone(),
        info: ApiInfo {
            title: config.api.title.clone(),
            version: config.api.version.clone(),
        },
    }
}

pub fn notifier_server(
    config: &Config,
    notifier: &NotifierConfig,
    email: Email,
    template: Template,
) -> NotifierServer {
    let recipient = notifier
        .recipient_email
        .clone()
        .with_name(notifier.recipient_name.clone());

    let notification = Notification::new(
        email,
        template,
        NotificationFeatureConfig {
            recipient: Arc::new(recipient),
        },
    );

    NotifierServer::new(
        notification,
        rest_server_config(config),
        smtp_configured(&notifier.smtp),
        recipient_configured(notifier),
    )
}

pub fn store_server(config: &Config, database_config: &DatabaseConfig, database: Database) -> StoreServer {
    let submission = Submission::new(database, ContactRequestRepo::default());

    StoreServer::new(
        submission,
        rest_server_config(config),
        database_configured(database_config),
    )
}

pub fn smtp_configured(smtp: &SmtpConfig) -> bool {
    !smtp.username.is_empty() && !smtp.password.is_empty()
}

pub fn recipient_configured(notifier: &NotifierConfig) -> bool {
    !notifier.recipient_email.as_str().is_empty() && !notifier.recipient_name.trim().is_empty()
}

pub fn database_configured(database: &DatabaseConfig) -> bool {
    !database.host.is_empty()
        && !database.user.is_empty()
        && !database.password.is_empty()
        && !database.name.is_empty()
}

#[cfg(test)]
mod tests {
    use mailbridge_config::{Secret, DEFAULT_CONFIG_PATH};

    use super::*;

    fn load_config(vars: &[(&str, &str)]) -> Config {
        let env = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        mailbridge_config::load_from(&[DEFAULT_CONFIG_PATH], Some(env)).unwrap()
    }

    #[test]
    fn smtp_credentials() {
        let config = load_config(&[
            ("MAILBRIDGE__NOTIFIER__RECIPIENT_EMAIL", "contact@example.com"),
            ("MAILBRIDGE__NOTIFIER__RECIPIENT_NAME", "Contact Team"),
            ("MAILBRIDGE__NOTIFIER__SMTP__USERNAME", ""),
            ("MAILBRIDGE__NOTIFIER__SMTP__PASSWORD", ""),
        ]);
        let mut smtp = config.notifier.unwrap().smtp;
        assert!(!smtp_configured(&smtp));

        smtp.username = "mailer@example.com".into();
        assert!(!smtp_configured(&smtp));

        smtp.password = Secret("hunter2".into());
        assert!(smtp_configured(&smtp));
    }

    #[test]
    fn database_credentials() {
        let config = load_config(&[
            ("MAILBRIDGE__STORE__DATABASE__USER", "mailbridge"),
            ("MAILBRIDGE__STORE__DATABASE__PASSWORD", ""),
            ("MAILBRIDGE__STORE__DATABASE__NAME", "mailbridge"),
        ]);
        let mut database = config.store.unwrap().database;
        assert!(!database_configured(&database));

        database.password = Secret("hunter2".into());
        assert!(database_configured(&database));
    }

    #[tokio::test]
    async fn build_notifier_server() {
        let config = load_config(&[
            ("MAILBRIDGE__NOTIFIER__RECIPIENT_EMAIL", "contact@example.com"),
            ("MAILBRIDGE__NOTIFIER__RECIPIENT_NAME", "Contact Team"),
            ("MAILBRIDGE__NOTIFIER__SMTP__USERNAME", "mailer@example.com"),
            ("MAILBRIDGE__NOTIFIER__SMTP__PASSWORD", "hunter2"),
        ]);
        let notifier = config.notifier.as_ref().unwrap();
        assert!(recipient_configured(notifier));

        notifier_server(
            &config,
            notifier,
            Email::dummy(),
            Template::new().unwrap(),
        );
    }

    #[tokio::test]
    async fn build_store_server() {
        let config = load_config(&[
            ("MAILBRIDGE__STORE__DATABASE__USER", "mailbridge"),
            ("MAILBRIDGE__STORE__DATABASE__PASSWORD", "hunter2"),
            ("MAILBRIDGE__STORE__DATABASE__NAME", "mailbridge"),
        ]);
        let database = &config.store.as_ref().unwrap().database;

        store_server(&config, database, Database::dummy());
    }
}
