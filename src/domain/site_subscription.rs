use super::SiteStatus;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub struct SiteSubscription {
    pub id: Uuid,
    pub subdomain: String,
    pub plan: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub expiry_date: Date,
    pub status: SiteStatus,
    pub failure_reason: Option<String>,
}
