use crate::domain::{AdminPassword, ContactEmail, SiteName};
use reqwest::{Client, Error};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

pub const SITE_CREATION_STARTED_SUBJECT: &str = "Site Creation Started";
pub const SITE_CREATION_COMPLETE_SUBJECT: &str = "Site Creation Complete";
pub const ADMIN_USERNAME: &str = "administrator";

/// Sends the site owner notifications through a Postmark-compatible API.
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: ContactEmail,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: ContactEmail,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url,
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(skip(self), fields(owner = %owner, site_name = %site_name))]
    pub async fn send_site_creation_started(
        &self,
        owner: &ContactEmail,
        site_name: &SiteName,
    ) -> Result<(), Error> {
        self.deliver(owner, Notification::creation_started(site_name))
            .await
    }

    /// Carries the only copy of the generated administrator password.
    #[tracing::instrument(skip(self, admin_password), fields(owner = %owner, site_name = %site_name))]
    pub async fn send_site_creation_complete(
        &self,
        owner: &ContactEmail,
        site_name: &SiteName,
        admin_password: &AdminPassword,
    ) -> Result<(), Error> {
        self.deliver(
            owner,
            Notification::creation_complete(site_name, admin_password),
        )
        .await
    }

    async fn deliver(&self, owner: &ContactEmail, notification: Notification) -> Result<(), Error> {
        let message = PostmarkMessage {
            from: self.sender.as_ref(),
            to: owner.as_ref(),
            subject: notification.subject,
            html_body: &notification.html_body,
            text_body: &notification.text_body,
        };

        self.http_client
            .post(format!("{}/email", &self.base_url))
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&message)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

struct Notification {
    subject: &'static str,
    html_body: String,
    text_body: String,
}

impl Notification {
    fn creation_started(site_name: &SiteName) -> Self {
        Self {
            subject: SITE_CREATION_STARTED_SUBJECT,
            html_body: format!(
                "Your site <b>{site_name}</b> is being created.<br />\
                We'll notify you once it's ready."
            ),
            text_body: format!(
                "Your site {site_name} is being created. We'll notify you once it's ready."
            ),
        }
    }

    fn creation_complete(site_name: &SiteName, admin_password: &AdminPassword) -> Self {
        let url = site_name.url();
        let password = admin_password.expose_secret();

        Self {
            subject: SITE_CREATION_COMPLETE_SUBJECT,
            html_body: format!(
                "Your site has been created successfully!<br />\
                URL: <a href=\"{url}\">{url}</a><br />\
                Username: {ADMIN_USERNAME}<br />\
                Password: {password}<br />\
                Please change your password after first login."
            ),
            text_body: format!(
                "Your site has been created successfully!\n\
                URL: {url}\n\
                Username: {ADMIN_USERNAME}\n\
                Password: {password}\n\
                Please change your password after first login."
            ),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PostmarkMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}
