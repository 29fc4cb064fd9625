use crate::domain::Subdomain;
use reqwest::{Client, Error};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

/// Creates the `A` records pointing new sites at the hosting server.
#[derive(Clone)]
pub struct DnsClient {
    http_client: Client,
    base_url: String,
    api_token: Secret<String>,
    zone_id: String,
    server_ip: String,
    proxied: bool,
}

impl DnsClient {
    pub fn new(
        base_url: String,
        api_token: Secret<String>,
        zone_id: String,
        server_ip: String,
        proxied: bool,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            api_token,
            zone_id,
            server_ip,
            proxied,
        })
    }

    #[tracing::instrument(skip(self), fields(subdomain = %subdomain))]
    pub async fn create_a_record(&self, subdomain: &Subdomain) -> Result<(), Error> {
        let url = format!("{}/zones/{}/dns_records", &self.base_url, &self.zone_id);
        let request_body = CreateRecordRequest {
            record_type: "A",
            name: subdomain.as_ref(),
            content: &self.server_ip,
            proxied: self.proxied,
        };

        self.http_client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    proxied: bool,
}
