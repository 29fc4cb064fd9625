use crate::{
    app_state::AppState,
    domain::{NewSiteSubscription, SiteName, SiteStatus},
    site_creator_client::MethodResponse,
    trigger::{CreateSiteArgs, CreateSitePayload, DEFAULT_ERROR_MESSAGE},
};
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::{Executor, Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

const SITE_CREATION_STARTED_MESSAGE: &str = "Site creation started";

#[tracing::instrument(
    name = "Create a site",
    skip(app_state, args),
    fields(subdomain = %args.subdomain, plan = %args.plan)
)]
pub(in crate::routes::sites) async fn create_site(
    State(app_state): State<AppState>,
    Json(args): Json<CreateSiteArgs>,
) -> Result<Json<MethodResponse<CreateSitePayload>>, CreateSiteError> {
    let new_site = NewSiteSubscription::parse(args.subdomain, args.plan, args.email)
        .map_err(CreateSiteError::ValidationError)?;

    let mut transaction = app_state
        .db_pool
        .begin()
        .await
        .context("Failed to begin transaction")?;

    let site_id =
        insert_site_subscription(&mut transaction, &new_site, app_state.provisioning.trial_days)
            .await?;
    enqueue_provisioning_task(&mut transaction, site_id).await?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    let site_name = SiteName::new(&new_site.subdomain, &app_state.provisioning.domain_suffix);
    if let Err(e) = app_state
        .email_client
        .send_site_creation_started(&new_site.email, &site_name)
        .await
    {
        tracing::warn!(
            error_cause_chain = ?e,
            error.message = %e,
            "Failed to send the site creation started email"
        );
    }

    Ok(Json(MethodResponse {
        message: Some(CreateSitePayload::success(SITE_CREATION_STARTED_MESSAGE)),
    }))
}

#[tracing::instrument(name = "Save new site subscription", skip(transaction, new_site))]
async fn insert_site_subscription(
    transaction: &mut Transaction<'_, Postgres>,
    new_site: &NewSiteSubscription,
    trial_days: i64,
) -> Result<Uuid, CreateSiteError> {
    let site_id = Uuid::new_v4();
    let created_at = OffsetDateTime::now_utc();
    let expiry_date = (created_at + Duration::days(trial_days)).date();

    let query = sqlx::query(
        r#"
        INSERT INTO site_subscriptions (id, subdomain, plan, email, created_at, expiry_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(site_id)
    .bind(new_site.subdomain.as_ref())
    .bind(new_site.plan.as_ref())
    .bind(new_site.email.as_ref())
    .bind(created_at)
    .bind(expiry_date)
    .bind(SiteStatus::Pending.as_str());

    match transaction.execute(query).await {
        Ok(_) => Ok(site_id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(CreateSiteError::SubdomainTaken)
        }
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
            CreateSiteError::UnknownPlan(new_site.plan.as_ref().to_string()),
        ),
        Err(e) => Err(anyhow::Error::new(e)
            .context("Failed to insert site subscription")
            .into()),
    }
}

#[tracing::instrument(name = "Enqueue site provisioning", skip(transaction))]
async fn enqueue_provisioning_task(
    transaction: &mut Transaction<'_, Postgres>,
    site_id: Uuid,
) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"
        INSERT INTO site_provisioning_queue (site_id, enqueued_at)
        VALUES ($1, now())
        "#,
    )
    .bind(site_id);

    transaction
        .execute(query)
        .await
        .context("Failed to enqueue site provisioning task")?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub(in crate::routes::sites) enum CreateSiteError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Subdomain already exists")]
    SubdomainTaken,
    #[error("Unknown plan `{0}`")]
    UnknownPlan(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl IntoResponse for CreateSiteError {
    fn into_response(self) -> Response {
        tracing::error!("{:#?}", self);

        let (status, message) = match &self {
            Self::ValidationError(_) | Self::UnknownPlan(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::SubdomainTaken => (StatusCode::CONFLICT, self.to_string()),
            Self::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                DEFAULT_ERROR_MESSAGE.to_string(),
            ),
        };

        let body = MethodResponse {
            message: Some(CreateSitePayload::error(message)),
        };

        (status, Json(body)).into_response()
    }
}
