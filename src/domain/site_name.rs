use super::Subdomain;
use std::fmt::{self, Display};

/// Fully qualified host name of a provisioned site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteName(String);

impl SiteName {
    pub fn new(subdomain: &Subdomain, domain_suffix: &str) -> Self {
        Self(format!(
            "{}.{}",
            subdomain.as_ref(),
            domain_suffix.trim_start_matches('.')
        ))
    }

    pub fn url(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl AsRef<str> for SiteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
