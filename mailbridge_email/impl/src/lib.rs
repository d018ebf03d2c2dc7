use std::time::Duration;

use anyhow::{anyhow, Context};
use lettre::{
    message::{Mailbox, MessageBuilder, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use mailbridge_email_contracts::{Email, EmailBody, EmailService};
use mailbridge_models::email_address::EmailAddress;
use mailbridge_utils::Apply;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddress,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[derive(Debug, Clone)]
pub struct SmtpTransportConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Upgrade the connection with STARTTLS before authenticating.
    pub use_tls: bool,
    pub timeout: Duration,
}

impl EmailServiceImpl {
    pub fn new(config: &SmtpTransportConfig, from: EmailAddress) -> anyhow::Result<Self> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .with_context(|| format!("Failed to configure STARTTLS for {}", config.host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let transport = builder
            .port(config.port)
            .timeout(Some(config.timeout))
            .apply_if(!config.username.is_empty(), |builder| {
                builder.credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
            })
            .build();

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub fn dummy() -> Self {
        Self::new(
            &SmtpTransportConfig {
                host: "localhost".into(),
                port: 25,
                username: String::new(),
                password: String::new(),
                use_tls: false,
                timeout: Duration::from_secs(1),
            },
            "dummy@example.com".parse().unwrap(),
        )
        .unwrap()
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = build_message(&self.from, email)?;

        let response = self
            .transport
            .send(message)
            .await
            .context("Failed to submit email to smtp server")?;
        debug!(code = %response.code(), "smtp server responded");

        Ok(response.is_positive())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn build_message(from: &EmailAddress, email: Email) -> anyhow::Result<Message> {
    let builder = Message::builder()
        .from(Mailbox::new(None, from.0.clone()))
        .to(email.recipient.0)
        .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
        .subject(email.subject);

    let message = match email.body {
        EmailBody::Text(text) => builder.singlepart(SinglePart::plain(text)),
        EmailBody::Alternative { text, html } => {
            builder.multipart(MultiPart::alternative_plain_html(text, html))
        }
    }
    .context("Failed to build email message")?;

    Ok(message)
}
