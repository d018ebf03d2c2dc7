use std::future::Future;

use mailbridge_models::contact::{ContactRequest, PersistedContact};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait SubmissionFeatureService: Send + Sync + 'static {
    /// Persist the given contact request.
    ///
    /// Returns the stored record including the id and timestamp assigned by
    /// the database.
    fn submit(
        &self,
        request: ContactRequest,
    ) -> impl Future<Output = Result<PersistedContact, SubmissionError>> + Send;
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The record could not be written, e.g. because the database is
    /// unreachable.
    #[error("Failed to store contact request: {0:#}")]
    Delivery(anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockSubmissionFeatureService {
    pub fn with_submit(
        mut self,
        request: ContactRequest,
        result: Result<PersistedContact, SubmissionError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
