use crate::{
    app_state::AppState,
    domain::{SiteStatus, SiteSubscription, Subdomain},
    site_creator_client::ResourceResponse,
};
use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::{PgPool, Row};

#[tracing::instrument(name = "Get site subscription", skip(app_state))]
pub(in crate::routes::sites) async fn get_site_subscription(
    State(app_state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<ResourceResponse<SiteSubscriptionResource>>, ResourceError> {
    let subdomain = Subdomain::parse(subdomain).map_err(ResourceError::InvalidSubdomain)?;

    match fetch_site_subscription(&app_state.db_pool, &subdomain).await? {
        Some(site) => Ok(Json(ResourceResponse { data: site.into() })),
        None => Err(ResourceError::NotFound(subdomain)),
    }
}

#[derive(Debug, thiserror::Error)]
pub(in crate::routes::sites) enum ResourceError {
    #[error("{0}")]
    InvalidSubdomain(String),
    #[error("Site Subscription {0} not found")]
    NotFound(Subdomain),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl ResourceError {
    fn exc_type(&self) -> &'static str {
        match self {
            Self::InvalidSubdomain(_) => "ValidationError",
            Self::NotFound(_) => "DoesNotExistError",
            Self::UnexpectedError(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidSubdomain(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::UnexpectedError(e) => {
                tracing::error!(error_cause_chain = ?e, "Failed to load site subscription");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        let body = ErrorBody {
            exc_type: self.exc_type(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    exc_type: &'static str,
    message: String,
}

#[tracing::instrument(skip(db_pool))]
async fn fetch_site_subscription(
    db_pool: &PgPool,
    subdomain: &Subdomain,
) -> Result<Option<SiteSubscription>, anyhow::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, subdomain, plan, email, created_at, expiry_date, status, failure_reason
        FROM site_subscriptions
        WHERE subdomain = $1
        "#,
    )
    .bind(subdomain.as_ref())
    .fetch_optional(db_pool)
    .await
    .context("Failed to fetch site subscription")?;

    row.map(|row| -> Result<SiteSubscription, anyhow::Error> {
        let status: String = row.try_get("status")?;
        Ok(SiteSubscription {
            id: row.try_get("id")?,
            subdomain: row.try_get("subdomain")?,
            plan: row.try_get("plan")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            expiry_date: row.try_get("expiry_date")?,
            status: SiteStatus::try_from(status).map_err(anyhow::Error::msg)?,
            failure_reason: row.try_get("failure_reason")?,
        })
    })
    .transpose()
}

#[derive(Serialize)]
pub(in crate::routes::sites) struct SiteSubscriptionResource {
    subdomain: String,
    plan: String,
    email: String,
    created_at: String,
    expiry_date: String,
    status: &'static str,
    failure_reason: Option<String>,
}

impl From<SiteSubscription> for SiteSubscriptionResource {
    fn from(site: SiteSubscription) -> Self {
        Self {
            subdomain: site.subdomain,
            plan: site.plan,
            email: site.email,
            created_at: site.created_at.to_string(),
            expiry_date: site.expiry_date.to_string(),
            status: site.status.as_str(),
            failure_reason: site.failure_reason,
        }
    }
}
