use serde::{Deserialize, Serialize};

pub const SUCCESS_STATUS: &str = "success";

/// Body returned by the `create_site` procedure. Both fields are optional on
/// the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateSitePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateSitePayload {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Some(SUCCESS_STATUS.into()),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some("error".into()),
            message: Some(message.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateSiteOutcome {
    Success,
    Failure { message: Option<String> },
}

impl From<Option<CreateSitePayload>> for CreateSiteOutcome {
    fn from(payload: Option<CreateSitePayload>) -> Self {
        match payload {
            Some(CreateSitePayload {
                status: Some(status),
                ..
            }) if status == SUCCESS_STATUS => CreateSiteOutcome::Success,
            Some(payload) => CreateSiteOutcome::Failure {
                message: payload.message,
            },
            None => CreateSiteOutcome::Failure { message: None },
        }
    }
}
