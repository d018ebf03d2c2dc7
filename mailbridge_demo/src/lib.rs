use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use mailbridge_models::{
    contact::{ContactRequest, ContactRequestInput, PersistedContact},
    email_address::EmailAddressWithName,
};

pub static JANE_INPUT: LazyLock<ContactRequestInput> = LazyLock::new(|| ContactRequestInput {
    fullname: Some("Jane Doe".into()),
    email: Some("jane@example.com".into()),
    phone: Some("555-1234".into()),
    company: Some("Acme".into()),
    message: Some("Interested in pricing".into()),
});

pub static JANE: LazyLock<ContactRequest> =
    LazyLock::new(|| JANE_INPUT.clone().try_into().unwrap());

pub static JANE_PERSISTED: LazyLock<PersistedContact> = LazyLock::new(|| PersistedContact {
    id: 1.into(),
    request: JANE.clone(),
    created_at: created_at(),
});

pub static XSS_INPUT: LazyLock<ContactRequestInput> = LazyLock::new(|| ContactRequestInput {
    fullname: Some("Mallory".into()),
    email: Some("mallory@example.com".into()),
    phone: Some("+1 555 0000".into()),
    company: Some("Tom & Jerry <b>Inc</b>".into()),
    message: Some("<script>alert(1)</script>".into()),
});

pub static XSS: LazyLock<ContactRequest> =
    LazyLock::new(|| XSS_INPUT.clone().try_into().unwrap());

pub fn recipient() -> EmailAddressWithName {
    "Contact Team <contact@example.com>".parse().unwrap()
}

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap()
}
