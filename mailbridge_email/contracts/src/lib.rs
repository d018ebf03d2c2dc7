use std::future::Future;

use mailbridge_models::email_address::EmailAddressWithName;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Submit the email to the smtp relay.
    ///
    /// Returns `Ok(false)` if the relay answered with a negative response.
    fn send(&self, email: Email) -> impl Future<Output = anyhow::Result<bool>> + Send;

    /// Verify that the smtp relay is reachable and accepts our credentials.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: EmailBody,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    /// A `multipart/alternative` body. Clients prefer the last part they can
    /// display, so the plain text part comes first.
    Alternative { text: String, html: String },
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: bool) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_send_error(mut self, email: Email, error: &'static str) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Err(anyhow::anyhow!(error)))));
        self
    }
}
