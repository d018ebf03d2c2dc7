use anyhow::{ensure, Context};
use clap::Subcommand;
use mailbridge_config::Config;
use mailbridge_email_contracts::{Email, EmailBody, EmailService};
use mailbridge_models::email_address::EmailAddressWithName;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Send a plain text test email using the notifier's smtp settings
    Test { recipient: EmailAddressWithName },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let smtp = &config
        .notifier
        .as_ref()
        .context("The notifier section is missing from the config")?
        .smtp;
    let email_service = email::connect(smtp)?;

    let ok = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody::Text("Email deliverability seems to be working!".into()),
            reply_to: None,
        })
        .await?;

    ensure!(ok, "The smtp server rejected the test email");
    println!("Test email sent");

    Ok(())
}
