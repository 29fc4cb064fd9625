use crate::{dns_client::DnsClient, domain::ContactEmail, email_client::EmailClient};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use std::{path::PathBuf, time::Duration};
use tracing_log::log::LevelFilter;

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub dns: DnsSettings,
    pub provisioning: ProvisioningSettings,
}

#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.database_name)
            .log_statements(LevelFilter::Trace)
    }

    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .ssl_mode(ssl_mode)
    }
}

#[derive(Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    sender_email: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<ContactEmail, String> {
        ContactEmail::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(&self) -> Result<EmailClient, anyhow::Error> {
        let sender = self.sender().map_err(anyhow::Error::msg)?;
        EmailClient::new(
            self.base_url.clone(),
            sender,
            self.authorization_token.clone(),
            self.timeout(),
        )
    }
}

/// Cloudflare-compatible DNS API the site records are created in.
#[derive(Clone, Deserialize)]
pub struct DnsSettings {
    pub base_url: String,
    pub api_token: Secret<String>,
    pub zone_id: String,
    pub server_ip: String,
    pub proxied: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl DnsSettings {
    pub fn client(&self) -> Result<DnsClient, anyhow::Error> {
        DnsClient::new(
            self.base_url.clone(),
            self.api_token.clone(),
            self.zone_id.clone(),
            self.server_ip.clone(),
            self.proxied,
            Duration::from_millis(self.timeout_milliseconds),
        )
    }
}

#[derive(Clone, Deserialize)]
pub struct ProvisioningSettings {
    /// Executable of the site management tool, `bench` in production.
    pub bench_command: PathBuf,
    pub bench_directory: Option<PathBuf>,
    pub domain_suffix: String,
    pub mariadb_root_password: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub trial_days: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub empty_queue_delay_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub error_delay_seconds: u64,
}

impl ProvisioningSettings {
    pub fn empty_queue_delay(&self) -> Duration {
        Duration::from_secs(self.empty_queue_delay_seconds)
    }

    pub fn error_delay(&self) -> Duration {
        Duration::from_secs(self.error_delay_seconds)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let config_dir = std::env::current_dir()
        .map(|dir| dir.join("configuration"))
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let env_config = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.yaml")))
        .add_source(config::File::from(config_dir.join(env_config)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "`{other}` is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}
