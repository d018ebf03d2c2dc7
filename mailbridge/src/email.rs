use anyhow::Context;
use mailbridge_config::SmtpConfig;
use mailbridge_email_impl::{EmailServiceImpl, SmtpTransportConfig};
use mailbridge_models::email_address::EmailAddress;

/// Configure the smtp transport. No connection is established until the
/// first email is sent or the server is pinged.
pub fn connect(config: &SmtpConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(
        &SmtpTransportConfig {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.expose().into(),
            use_tls: config.use_tls,
            timeout: config.timeout.into(),
        },
        sender_address(config)?,
    )
    .context("Failed to configure smtp transport")
}

/// The configured `from` address, or the smtp username if none is set.
pub fn sender_address(config: &SmtpConfig) -> anyhow::Result<EmailAddress> {
    match &config.from {
        Some(from) => Ok(from.clone()),
        None => config.username.parse().with_context(|| {
            format!(
                "notifier.smtp.from is not set and the smtp username {:?} is not a valid email \
                 address",
                config.username
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use mailbridge_config::{Duration, Secret};
    use pretty_assertions::assert_eq;

    use super::*;

    fn smtp_config(username: &str, from: Option<&str>) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            username: username.into(),
            password: Secret("hunter2".into()),
            use_tls: false,
            from: from.map(|from| from.parse().unwrap()),
            timeout: Duration(std::time::Duration::from_secs(10)),
        }
    }

    #[test]
    fn sender_from_config() {
        // Arrange
        let config = smtp_config("mailer@example.com", Some("noreply@example.com"));

        // Act
        let result = sender_address(&config);

        // Assert
        assert_eq!(result.unwrap().as_str(), "noreply@example.com");
    }

    #[test]
    fn sender_falls_back_to_username() {
        // Arrange
        let config = smtp_config("mailer@example.com", None);

        // Act
        let result = sender_address(&config);

        // Assert
        assert_eq!(result.unwrap().as_str(), "mailer@example.com");
    }

    #[test]
    fn sender_missing() {
        // Arrange
        let config = smtp_config("mailer", None);

        // Act
        let result = sender_address(&config);

        // Assert
        result.unwrap_err();
    }
}
