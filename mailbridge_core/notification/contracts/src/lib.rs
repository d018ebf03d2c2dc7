use std::future::Future;

use mailbridge_models::contact::ContactRequest;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait NotificationFeatureService: Send + Sync + 'static {
    /// Deliver a notification about the given contact request to the
    /// configured recipient.
    ///
    /// The email is sent on behalf of the service, replies go to the
    /// submitter.
    fn send_notification(
        &self,
        request: ContactRequest,
    ) -> impl Future<Output = Result<(), NotificationSendError>> + Send;
}

#[derive(Debug, Error)]
pub enum NotificationSendError {
    /// The smtp server could not be reached or refused the message.
    #[error("Failed to deliver notification: {0:#}")]
    Delivery(anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockNotificationFeatureService {
    pub fn with_send_notification(
        mut self,
        request: ContactRequest,
        result: Result<(), NotificationSendError>,
    ) -> Self {
        self.expect_send_notification()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
