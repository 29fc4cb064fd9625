use crate::{configuration::ProvisioningSettings, email_client::EmailClient};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub email_client: EmailClient,
    pub provisioning: ProvisioningSettings,
}
