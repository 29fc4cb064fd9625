use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{self, Display};

const MAX_LABEL_LENGTH: usize = 63;

/// A single DNS label the new site is served under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Subdomain(String);

impl Subdomain {
    pub fn parse(s: String) -> Result<Subdomain, String> {
        static RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

        match s {
            _ if s.is_empty() => Err("Subdomain is empty".to_string()),
            _ if s.len() > MAX_LABEL_LENGTH => Err(format!(
                "`{s}` is longer than {MAX_LABEL_LENGTH} characters"
            )),
            _ if !RE.is_match(&s) => Err(format!(
                "`{s}` must contain only lowercase letters, digits and inner hyphens"
            )),
            _ => Ok(Self(s)),
        }
    }
}

impl AsRef<str> for Subdomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
