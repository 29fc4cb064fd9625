#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteStatus {
    Pending,
    Active,
    Failed,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Pending => "pending",
            SiteStatus::Active => "active",
            SiteStatus::Failed => "failed",
        }
    }
}

impl AsRef<str> for SiteStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for SiteStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "pending" => Ok(SiteStatus::Pending),
            "active" => Ok(SiteStatus::Active),
            "failed" => Ok(SiteStatus::Failed),
            other => Err(format!("`{other}` is not a valid variant of SiteStatus")),
        }
    }
}
