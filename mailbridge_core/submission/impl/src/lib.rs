use mailbridge_core_submission_contracts::{SubmissionError, SubmissionFeatureService};
use mailbridge_models::contact::{ContactRequest, PersistedContact};
use mailbridge_persistence_contracts::{
    contact::ContactRequestRepository, Database, Transaction,
};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct SubmissionFeatureServiceImpl<Db, ContactRequestRepo> {
    db: Db,
    contact_request_repo: ContactRequestRepo,
}

impl<Db, ContactRequestRepo> SubmissionFeatureServiceImpl<Db, ContactRequestRepo> {
    pub fn new(db: Db, contact_request_repo: ContactRequestRepo) -> Self {
        Self {
            db,
            contact_request_repo,
        }
    }
}

impl<Db, ContactRequestRepo> SubmissionFeatureService
    for SubmissionFeatureServiceImpl<Db, ContactRequestRepo>
where
    Db: Database,
    ContactRequestRepo: ContactRequestRepository<Db::Transaction>,
{
    async fn submit(&self, request: ContactRequest) -> Result<PersistedContact, SubmissionError> {
        match self.store(&request).await {
            Ok(persisted) => {
                info!(id = %persisted.id, sender = %request.email, "contact request stored");
                Ok(persisted)
            }
            Err(err) => {
                error!(sender = %request.email, "Failed to store contact request: {err:#}");
                Err(SubmissionError::Delivery(err))
            }
        }
    }
}

impl<Db, ContactRequestRepo> SubmissionFeatureServiceImpl<Db, ContactRequestRepo>
where
    Db: Database,
    ContactRequestRepo: ContactRequestRepository<Db::Transaction>,
{
    async fn store(&self, request: &ContactRequest) -> anyhow::Result<PersistedContact> {
        let mut txn = self.db.begin_transaction().await?;

        match self.contact_request_repo.create(&mut txn, request).await {
            Ok(persisted) => {
                txn.commit().await?;
                Ok(persisted)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("{rollback_err:#}");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mailbridge_demo::{JANE, JANE_PERSISTED};
    use mailbridge_persistence_contracts::{contact::MockContactRequestRepository, MockDatabase};
    use mailbridge_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn ok() {
        // Arrange
        let db = MockDatabase::build(true);
        let contact_request_repo =
            MockContactRequestRepository::new().with_create(JANE.clone(), JANE_PERSISTED.clone());

        let sut = SubmissionFeatureServiceImpl::new(db, contact_request_repo);

        // Act
        let result = sut.submit(JANE.clone()).await;

        // Assert
        assert_eq!(result.unwrap(), *JANE_PERSISTED);
    }

    #[tokio::test]
    async fn insert_fails() {
        // Arrange
        let db = MockDatabase::build_expect_rollback();
        let contact_request_repo = MockContactRequestRepository::new()
            .with_create_error(JANE.clone(), "relation \"contact_requests\" does not exist");

        let sut = SubmissionFeatureServiceImpl::new(db, contact_request_repo);

        // Act
        let result = sut.submit(JANE.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(SubmissionError::Delivery(err))
                if format!("{err:#}") == "relation \"contact_requests\" does not exist"
        );
    }

    #[tokio::test]
    async fn database_unavailable() {
        // Arrange
        let db = MockDatabase::new().with_begin_transaction_error("Connection refused");
        let contact_request_repo = MockContactRequestRepository::new();

        let sut = SubmissionFeatureServiceImpl::new(db, contact_request_repo);

        // Act
        let result = sut.submit(JANE.clone()).await;

        // Assert
        assert_matches!(
            result,
            Err(SubmissionError::Delivery(err))
                if format!("{err:#}") == "Connection refused"
        );
    }
}
