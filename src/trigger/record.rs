use serde::{Deserialize, Serialize};

/// Snapshot of the fields the action reads from a site subscription record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionRecord {
    pub subdomain: Option<String>,
    pub plan: Option<String>,
    pub email: Option<String>,
    /// The record only exists in the client's view and was never saved.
    #[serde(default)]
    pub is_local: bool,
}

impl SubscriptionRecord {
    pub fn new(subdomain: &str, plan: &str, email: &str) -> Self {
        Self {
            subdomain: Some(subdomain.into()),
            plan: Some(plan.into()),
            email: Some(email.into()),
            is_local: true,
        }
    }

    pub fn saved(self) -> Self {
        Self {
            is_local: false,
            ..self
        }
    }

    /// Names of the required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("subdomain", &self.subdomain),
            ("plan", &self.plan),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }
}
