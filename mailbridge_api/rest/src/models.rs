use mailbridge_models::contact::ContactRequestInput;
use serde::{Deserialize, Serialize};

/// Body of the action endpoints.
///
/// Missing fields are accepted here so the validator can report all of them
/// at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContactRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

impl From<ApiContactRequest> for ContactRequestInput {
    fn from(value: ApiContactRequest) -> Self {
        Self {
            fullname: value.fullname,
            email: value.email,
            phone: value.phone,
            company: value.company,
            message: value.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiServiceInfo {
    pub service: String,
    pub version: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiHealth<F> {
    pub status: &'static str,
    #[serde(flatten)]
    pub flags: F,
}
