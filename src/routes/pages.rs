use crate::app_state::AppState;
use anyhow::Context;
use askama_axum::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(plans))
        .route("/my-sites", get(my_sites))
}

#[tracing::instrument(name = "Render plans page", skip(app_state))]
async fn plans(
    State(app_state): State<AppState>,
) -> Result<PlansTemplate<'static>, PageError> {
    let plans = get_plans(&app_state.db_pool).await?;

    Ok(PlansTemplate {
        title: "Choose a plan",
        plans,
    })
}

#[tracing::instrument(name = "Render sites page", skip(app_state))]
async fn my_sites(
    State(app_state): State<AppState>,
) -> Result<SitesTemplate<'static>, PageError> {
    let sites = get_sites(&app_state.db_pool).await?;

    Ok(SitesTemplate {
        title: "My sites",
        sites,
    })
}

/// Listing failures are never the visitor's fault.
#[derive(Debug, thiserror::Error)]
#[error("Failed to render page")]
struct PageError(#[from] anyhow::Error);

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!(error_cause_chain = ?self.0, "{self}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

#[tracing::instrument(skip(db_pool))]
async fn get_plans(db_pool: &PgPool) -> Result<Vec<PlanRow>, anyhow::Error> {
    sqlx::query_as::<_, PlanRow>(
        r#"
        SELECT name, plan_name, price_cents
        FROM subscription_plans
        ORDER BY price_cents, name
        "#,
    )
    .fetch_all(db_pool)
    .await
    .context("Failed to fetch subscription plans")
}

#[tracing::instrument(skip(db_pool))]
async fn get_sites(db_pool: &PgPool) -> Result<Vec<SiteRow>, anyhow::Error> {
    sqlx::query_as::<_, SiteRow>(
        r#"
        SELECT subdomain, plan, created_at, expiry_date, status
        FROM site_subscriptions
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db_pool)
    .await
    .context("Failed to fetch site subscriptions")
}

#[derive(FromRow)]
struct PlanRow {
    name: String,
    plan_name: String,
    price_cents: i64,
}

impl PlanRow {
    fn price(&self) -> String {
        format!("{}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

#[derive(FromRow)]
struct SiteRow {
    subdomain: String,
    plan: String,
    created_at: OffsetDateTime,
    expiry_date: Date,
    status: String,
}

impl SiteRow {
    fn created_on(&self) -> Date {
        self.created_at.date()
    }
}

#[derive(Template)]
#[template(path = "web/plans.html")]
struct PlansTemplate<'a> {
    title: &'a str,
    plans: Vec<PlanRow>,
}

#[derive(Template)]
#[template(path = "web/sites.html")]
struct SitesTemplate<'a> {
    title: &'a str,
    sites: Vec<SiteRow>,
}
