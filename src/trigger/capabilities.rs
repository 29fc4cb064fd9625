use super::{CreateSitePayload, SubscriptionRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Arguments of the `create_site` procedure, passed through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreateSiteArgs {
    pub subdomain: String,
    pub plan: String,
    pub email: String,
}

impl From<&SubscriptionRecord> for CreateSiteArgs {
    fn from(record: &SubscriptionRecord) -> Self {
        Self {
            subdomain: record.subdomain.clone().unwrap_or_default(),
            plan: record.plan.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    Green,
    Red,
}

#[async_trait]
pub trait RemoteProcedure: Send + Sync {
    /// `None` when the call completed without a usable payload.
    async fn create_site(&self, args: &CreateSiteArgs) -> Option<CreateSitePayload>;
}

#[async_trait]
pub trait RecordReloader: Send + Sync {
    async fn reload(&self, record: &SubscriptionRecord)
        -> Result<SubscriptionRecord, anyhow::Error>;
}

pub trait Ui: Send + Sync {
    /// Blocking message the user has to dismiss.
    fn msgprint(&self, message: &str);
    fn show_alert(&self, message: &str, indicator: Indicator);
    fn freeze(&self, message: &str);
    fn unfreeze(&self);
}

pub struct Capabilities<'a> {
    pub remote: &'a dyn RemoteProcedure,
    pub ui: &'a dyn Ui,
    pub reloader: &'a dyn RecordReloader,
}
