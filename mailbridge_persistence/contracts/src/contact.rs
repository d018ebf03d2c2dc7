use std::future::Future;

use mailbridge_models::contact::{ContactRequest, ContactRequestId, PersistedContact};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRequestRepository<Txn: Send + Sync + 'static>: Send + Sync + 'static {
    /// Insert a new contact request.
    ///
    /// The id and the creation timestamp are assigned by the database.
    fn create(
        &self,
        txn: &mut Txn,
        request: &ContactRequest,
    ) -> impl Future<Output = anyhow::Result<PersistedContact>> + Send;

    /// Return the contact request with the given id.
    fn get(
        &self,
        txn: &mut Txn,
        id: ContactRequestId,
    ) -> impl Future<Output = anyhow::Result<Option<PersistedContact>>> + Send;
}

#[cfg(feature = "mock")]
impl<Txn: Send + Sync + 'static> MockContactRequestRepository<Txn> {
    pub fn with_create(mut self, request: ContactRequest, result: PersistedContact) -> Self {
        self.expect_create()
            .once()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(request),
            )
            .return_once(|_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_create_error(mut self, request: ContactRequest, error: &'static str) -> Self {
        self.expect_create()
            .once()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(request),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(Err(anyhow::anyhow!(error)))));
        self
    }

    pub fn with_get(mut self, id: ContactRequestId, result: Option<PersistedContact>) -> Self {
        self.expect_get()
            .once()
            .with(mockall::predicate::always(), mockall::predicate::eq(id))
            .return_once(|_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }
}
