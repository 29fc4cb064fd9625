use crate::trigger::{
    CreateSiteArgs, CreateSitePayload, RecordReloader, RemoteProcedure, SubscriptionRecord,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CREATE_SITE_PATH: &str = "/api/method/create_site";
pub const SITE_SUBSCRIPTION_RESOURCE_PATH: &str = "/api/resource/site_subscription";

/// Envelope wrapping the return value of a remote method.
#[derive(Debug, Deserialize, Serialize)]
pub struct MethodResponse<T> {
    pub message: Option<T>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResourceResponse<T> {
    pub data: T,
}

/// Talks to the site creator server on behalf of the "Create Site" action.
#[derive(Clone)]
pub struct SiteCreatorClient {
    http_client: Client,
    base_url: String,
}

impl SiteCreatorClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url,
        })
    }

    /// `subdomain` becomes a single, percent-encoded path segment.
    fn resource_url(&self, subdomain: &str) -> Result<Url, anyhow::Error> {
        let mut url = Url::parse(&format!(
            "{}{SITE_SUBSCRIPTION_RESOURCE_PATH}",
            &self.base_url
        ))
        .context("Invalid site creator base URL")?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Site creator base URL cannot hold a path"))?
            .push(subdomain);

        Ok(url)
    }

    async fn call_create_site(
        &self,
        args: &CreateSiteArgs,
    ) -> Result<Option<CreateSitePayload>, reqwest::Error> {
        let envelope = self
            .http_client
            .post(format!("{}{CREATE_SITE_PATH}", &self.base_url))
            .json(args)
            .send()
            .await?
            .json::<MethodResponse<CreateSitePayload>>()
            .await?;

        Ok(envelope.message)
    }
}

#[async_trait]
impl RemoteProcedure for SiteCreatorClient {
    #[tracing::instrument(name = "Call create_site", skip(self, args), fields(subdomain = %args.subdomain))]
    async fn create_site(&self, args: &CreateSiteArgs) -> Option<CreateSitePayload> {
        match self.call_create_site(args).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    error_cause_chain = ?e,
                    error.message = %e,
                    "create_site returned no usable payload"
                );
                None
            }
        }
    }
}

#[async_trait]
impl RecordReloader for SiteCreatorClient {
    #[tracing::instrument(name = "Reload site subscription", skip(self, record))]
    async fn reload(&self, record: &SubscriptionRecord) -> Result<SubscriptionRecord, anyhow::Error> {
        let subdomain = record
            .subdomain
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("Record has no subdomain to reload by")?;

        let response = self
            .http_client
            .get(self.resource_url(subdomain)?)
            .send()
            .await
            .context("Failed to request the site subscription")?
            .error_for_status()
            .context("Site subscription lookup was rejected")?
            .json::<ResourceResponse<SubscriptionRecord>>()
            .await
            .context("Failed to decode the site subscription")?;

        Ok(response.data)
    }
}
