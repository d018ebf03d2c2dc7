use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    email_address::EmailAddress,
    macros::{id, nutype_string},
};

id!(ContactRequestId);

/// A contact form submission exactly as it was received.
///
/// Every field is optional so that missing fields are reported together with
/// all other violations instead of failing on the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRequestInput {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

/// A validated and sanitized contact form submission.
///
/// None of the text fields contain carriage returns, line feeds or NUL
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub fullname: ContactFullName,
    pub email: EmailAddress,
    pub phone: ContactPhone,
    pub company: ContactCompany,
    pub message: Option<ContactMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedContact {
    pub id: ContactRequestId,
    pub request: ContactRequest,
    pub created_at: DateTime<Utc>,
}

nutype_string!(ContactFullName(
    sanitize(with = sanitize_text),
    validate(len_char_min = 1, len_char_max = ContactFullName::MAX_LENGTH)
));
impl ContactFullName {
    pub const MAX_LENGTH: usize = 100;
}

nutype_string!(ContactPhone(
    sanitize(with = sanitize_text),
    validate(len_char_min = 1, len_char_max = ContactPhone::MAX_LENGTH)
));
impl ContactPhone {
    pub const MAX_LENGTH: usize = 50;
}

nutype_string!(ContactCompany(
    sanitize(with = sanitize_text),
    validate(len_char_min = 1, len_char_max = ContactCompany::MAX_LENGTH)
));
impl ContactCompany {
    pub const MAX_LENGTH: usize = 200;
}

nutype_string!(ContactMessage(
    sanitize(with = sanitize_text),
    validate(len_char_max = ContactMessage::MAX_LENGTH)
));
impl ContactMessage {
    pub const MAX_LENGTH: usize = 500;
}

pub const EMAIL_MAX_LENGTH: usize = 254;

/// Strip carriage returns and NUL characters, collapse line feeds into
/// spaces and trim surrounding whitespace.
pub fn sanitize_text(value: String) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\r' | '\0'))
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_owned()
}

fn parse_email(raw: &str) -> Result<EmailAddress, ContactFieldViolation> {
    // rejected regardless of what the address grammar accepts
    if raw.contains(['\r', '\n', '\0']) {
        return Err(ContactFieldViolation::InvalidEmail);
    }

    if raw.chars().count() > EMAIL_MAX_LENGTH {
        return Err(ContactFieldViolation::TooLong {
            max: EMAIL_MAX_LENGTH,
        });
    }

    raw.parse()
        .map_err(|_| ContactFieldViolation::InvalidEmail)
}

impl TryFrom<ContactRequestInput> for ContactRequest {
    type Error = ContactRequestValidationError;

    fn try_from(input: ContactRequestInput) -> Result<Self, Self::Error> {
        let mut violations = Violations::default();

        let fullname = violations.check(
            ContactField::FullName,
            required(input.fullname)
                .and_then(|x| ContactFullName::try_new(x).map_err(Into::into)),
        );
        let email = violations.check(
            ContactField::Email,
            required(input.email).and_then(|x| parse_email(&x)),
        );
        let phone = violations.check(
            ContactField::Phone,
            required(input.phone).and_then(|x| ContactPhone::try_new(x).map_err(Into::into)),
        );
        let company = violations.check(
            ContactField::Company,
            required(input.company)
                .and_then(|x| ContactCompany::try_new(x).map_err(Into::into)),
        );
        let message = violations.check(
            ContactField::Message,
            input
                .message
                .map(ContactMessage::try_new)
                .transpose()
                .map(|message| message.filter(|x| !x.is_empty()))
                .map_err(Into::into),
        );

        match (fullname, email, phone, company, message) {
            (Some(fullname), Some(email), Some(phone), Some(company), Some(message)) => Ok(Self {
                fullname,
                email,
                phone,
                company,
                message,
            }),
            _ => Err(violations.into_error()),
        }
    }
}

impl From<ContactRequest> for ContactRequestInput {
    fn from(value: ContactRequest) -> Self {
        Self {
            fullname: Some(value.fullname.into_inner()),
            email: Some(value.email.as_str().to_owned()),
            phone: Some(value.phone.into_inner()),
            company: Some(value.company.into_inner()),
            message: value.message.map(ContactMessage::into_inner),
        }
    }
}

fn required(value: Option<String>) -> Result<String, ContactFieldViolation> {
    value.ok_or(ContactFieldViolation::Missing)
}

#[derive(Debug, Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn check<T>(
        &mut self,
        field: ContactField,
        result: Result<T, ContactFieldViolation>,
    ) -> Option<T> {
        result
            .map_err(|violation| self.0.push(FieldViolation { field, violation }))
            .ok()
    }

    fn into_error(self) -> ContactRequestValidationError {
        ContactRequestValidationError {
            violations: self.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_violations(violations))]
pub struct ContactRequestValidationError {
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: ContactField,
    pub violation: ContactFieldViolation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.violation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FullName,
    Email,
    Phone,
    Company,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullname",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Company => "company",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactFieldViolation {
    #[error("field required")]
    Missing,
    #[error("must not be empty")]
    Empty,
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("invalid email format")]
    InvalidEmail,
}

macro_rules! length_violations {
    ($($ty:ident => $error:ident),* $(,)?) => {
        $(
            impl From<$error> for ContactFieldViolation {
                fn from(value: $error) -> Self {
                    match value {
                        $error::LenCharMinViolated => Self::Empty,
                        $error::LenCharMaxViolated => Self::TooLong {
                            max: $ty::MAX_LENGTH,
                        },
                    }
                }
            }
        )*
    };
}

length_violations! {
    ContactFullName => ContactFullNameError,
    ContactPhone => ContactPhoneError,
    ContactCompany => ContactCompanyError,
}

impl From<ContactMessageError> for ContactFieldViolation {
    fn from(value: ContactMessageError) -> Self {
        match value {
            ContactMessageError::LenCharMaxViolated => Self::TooLong {
                max: ContactMessage::MAX_LENGTH,
            },
        }
    }
}
