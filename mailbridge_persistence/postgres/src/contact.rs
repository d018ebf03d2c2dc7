use bb8_postgres::tokio_postgres::Row;
use mailbridge_models::contact::{ContactRequest, ContactRequestId, PersistedContact};
use mailbridge_persistence_contracts::contact::ContactRequestRepository;

use crate::{arg_indices, columns, PostgresTransaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresContactRequestRepository;

columns!(contact_request as "c": "id", "fullname", "email", "phone", "company", "message", "created_at");
columns!(contact_request_input as "c": "fullname", "email", "phone", "company", "message");

impl ContactRequestRepository<PostgresTransaction> for PostgresContactRequestRepository {
    async fn create(
        &self,
        txn: &mut PostgresTransaction,
        request: &ContactRequest,
    ) -> anyhow::Result<PersistedContact> {
        let row = txn
            .txn()
            .query_one(
                &format!(
                    "insert into contact_requests ({CONTACT_REQUEST_INPUT_COL_NAMES}) values ({}) \
                     returning id, created_at",
                    arg_indices(1..=CONTACT_REQUEST_INPUT_CNT)
                ),
                &[
                    &request.fullname.as_str(),
                    &request.email.as_str(),
                    &request.phone.as_str(),
                    &request.company.as_str(),
                    &request.message.as_deref().map(String::as_str),
                ],
            )
            .await?;

        Ok(PersistedContact {
            id: row.get::<_, i32>(0).into(),
            request: request.clone(),
            created_at: row.get(1),
        })
    }

    async fn get(
        &self,
        txn: &mut PostgresTransaction,
        id: ContactRequestId,
    ) -> anyhow::Result<Option<PersistedContact>> {
        txn.txn()
            .query_opt(
                &format!("select {CONTACT_REQUEST_COLS} from contact_requests c where id=$1"),
                &[&*id],
            )
            .await
            .map_err(Into::into)
            .and_then(|row| row.map(|row| decode_contact_request(&row, &mut 0)).transpose())
    }
}

fn decode_contact_request(row: &Row, offset: &mut usize) -> anyhow::Result<PersistedContact> {
    let mut idx = || {
        *offset += 1;
        *offset - 1
    };

    Ok(PersistedContact {
        id: row.get::<_, i32>(idx()).into(),
        request: ContactRequest {
            fullname: row.get::<_, String>(idx()).try_into()?,
            email: row.get::<_, String>(idx()).parse()?,
            phone: row.get::<_, String>(idx()).try_into()?,
            company: row.get::<_, String>(idx()).try_into()?,
            message: row
                .get::<_, Option<String>>(idx())
                .map(TryInto::try_into)
                .transpose()?,
        },
        created_at: row.get(idx()),
    })
}
