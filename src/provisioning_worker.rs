use crate::{
    bench::Bench,
    configuration::{ProvisioningSettings, Settings},
    dns_client::DnsClient,
    domain::{AdminPassword, ContactEmail, SiteName, SiteStatus, Subdomain},
    email_client::EmailClient,
    startup::get_connection_pool,
};
use anyhow::Context;
use secrecy::Secret;
use sqlx::{Executor, PgPool, Postgres, Row, Transaction};
use time::OffsetDateTime;
use tracing::Span;
use uuid::Uuid;

pub async fn run_worker_until_stopped(config: Settings) -> Result<(), anyhow::Error> {
    let db_pool = get_connection_pool(&config.database);
    let provisioner = SiteProvisioner::from_settings(&config)?;
    worker_loop(&db_pool, &provisioner, &config.provisioning).await
}

async fn worker_loop(
    db_pool: &PgPool,
    provisioner: &SiteProvisioner,
    settings: &ProvisioningSettings,
) -> Result<(), anyhow::Error> {
    loop {
        match try_execute_task(db_pool, provisioner).await {
            Ok(ExecutionOutcome::TaskCompleted) => {}
            Ok(ExecutionOutcome::EmptyQueue) => {
                tokio::time::sleep(settings.empty_queue_delay()).await
            }
            Err(_) => tokio::time::sleep(settings.error_delay()).await,
        }
    }
}

/// Everything needed to turn a queued subscription into a running site.
pub struct SiteProvisioner {
    dns_client: DnsClient,
    email_client: EmailClient,
    bench: Bench,
    domain_suffix: String,
    mariadb_root_password: Option<Secret<String>>,
}

impl SiteProvisioner {
    pub fn new(
        dns_client: DnsClient,
        email_client: EmailClient,
        bench: Bench,
        domain_suffix: String,
        mariadb_root_password: Option<Secret<String>>,
    ) -> Self {
        Self {
            dns_client,
            email_client,
            bench,
            domain_suffix,
            mariadb_root_password,
        }
    }

    pub fn from_settings(config: &Settings) -> Result<Self, anyhow::Error> {
        let provisioning = &config.provisioning;
        Ok(Self::new(
            config.dns.client()?,
            config.email_client.client()?,
            Bench::new(
                provisioning.bench_command.clone(),
                provisioning.bench_directory.clone(),
            ),
            provisioning.domain_suffix.clone(),
            provisioning.mariadb_root_password.clone(),
        ))
    }

    /// The site only counts as created once its owner has the credentials,
    /// since the generated password is not stored anywhere else.
    async fn run(&self, db_pool: &PgPool, task: &ProvisioningTask) -> Result<(), anyhow::Error> {
        let subdomain = Subdomain::parse(task.subdomain.clone()).map_err(anyhow::Error::msg)?;
        let owner = ContactEmail::parse(task.email.clone()).map_err(anyhow::Error::msg)?;
        let site_name = SiteName::new(&subdomain, &self.domain_suffix);

        let admin_password = self
            .provision(db_pool, task, &subdomain, &site_name)
            .await?;

        self.email_client
            .send_site_creation_complete(&owner, &site_name, &admin_password)
            .await
            .context("Failed to deliver the site credentials")?;

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(site_name = %site_name))]
    async fn provision(
        &self,
        db_pool: &PgPool,
        task: &ProvisioningTask,
        subdomain: &Subdomain,
        site_name: &SiteName,
    ) -> Result<AdminPassword, anyhow::Error> {
        let mariadb_root_password = self
            .mariadb_root_password
            .as_ref()
            .context("MariaDB root password is not configured")?;
        let apps = get_plan_apps(db_pool, &task.plan).await?;
        let admin_password = AdminPassword::generate();

        self.dns_client
            .create_a_record(subdomain)
            .await
            .context("Failed to create DNS record")?;

        self.bench
            .new_site(site_name, &admin_password, mariadb_root_password)
            .await?;
        for app in &apps {
            self.bench.install_app(site_name, app).await?;
            self.bench.migrate(site_name).await?;
        }

        self.bench.add_domain(site_name).await?;
        self.bench.setup_nginx().await?;
        self.bench.reload_nginx().await?;

        Ok(admin_password)
    }
}

#[tracing::instrument(
    skip_all,
    fields(
        site_id=tracing::field::Empty,
        subdomain=tracing::field::Empty),
    err
)]
pub async fn try_execute_task(
    db_pool: &PgPool,
    provisioner: &SiteProvisioner,
) -> Result<ExecutionOutcome, anyhow::Error> {
    let Some((transaction, task)) = dequeue_task(db_pool).await? else {
        return Ok(ExecutionOutcome::EmptyQueue);
    };

    Span::current()
        .record("site_id", task.site_id.to_string())
        .record("subdomain", task.subdomain.as_str());

    if task.status != SiteStatus::Pending {
        tracing::warn!(
            status = task.status.as_str(),
            "Site already has a final status, discarding its task"
        );
    } else if task.provisioning_started_at.is_some() {
        // A previous attempt ran commands whose outcome never reached the
        // database. Running `new-site` again would hit a half-built site.
        let interrupted = anyhow::anyhow!(INTERRUPTED_MESSAGE);
        record_outcome(db_pool, task.site_id, &Err(interrupted)).await?;
    } else {
        mark_provisioning_started(db_pool, task.site_id).await?;
        let outcome = provisioner.run(db_pool, &task).await;
        record_outcome(db_pool, task.site_id, &outcome).await?;
    }

    delete_task(transaction, task.site_id).await?;

    Ok(ExecutionOutcome::TaskCompleted)
}

const INTERRUPTED_MESSAGE: &str = "Provisioning was interrupted before its outcome was recorded";

type PgTransaction = Transaction<'static, Postgres>;

struct ProvisioningTask {
    site_id: Uuid,
    subdomain: String,
    plan: String,
    email: String,
    status: SiteStatus,
    provisioning_started_at: Option<OffsetDateTime>,
}

#[tracing::instrument(skip_all)]
async fn dequeue_task(
    db_pool: &PgPool,
) -> Result<Option<(PgTransaction, ProvisioningTask)>, anyhow::Error> {
    let mut transaction = db_pool.begin().await?;
    let query = sqlx::query(
        r#"
        SELECT q.site_id, s.subdomain, s.plan, s.email, s.status, s.provisioning_started_at
        FROM site_provisioning_queue q
        JOIN site_subscriptions s ON s.id = q.site_id
        ORDER BY q.enqueued_at
        LIMIT 1
        FOR UPDATE OF q
        SKIP LOCKED
        "#,
    );

    match transaction.fetch_optional(query).await? {
        Some(row) => {
            let status: String = row.try_get("status")?;
            let task = ProvisioningTask {
                site_id: row.try_get("site_id")?,
                subdomain: row.try_get("subdomain")?,
                plan: row.try_get("plan")?,
                email: row.try_get("email")?,
                status: SiteStatus::try_from(status).map_err(anyhow::Error::msg)?,
                provisioning_started_at: row.try_get("provisioning_started_at")?,
            };
            Ok(Some((transaction, task)))
        }
        None => Ok(None),
    }
}

#[tracing::instrument(skip(db_pool))]
async fn mark_provisioning_started(db_pool: &PgPool, site_id: Uuid) -> Result<(), anyhow::Error> {
    sqlx::query(
        r#"
        UPDATE site_subscriptions
        SET provisioning_started_at = now()
        WHERE id = $1
        "#,
    )
    .bind(site_id)
    .execute(db_pool)
    .await
    .context("Failed to mark provisioning as started")?;

    Ok(())
}

/// Written outside the task transaction so the outcome survives a failure
/// to delete the task.
#[tracing::instrument(skip(db_pool, outcome))]
async fn record_outcome(
    db_pool: &PgPool,
    site_id: Uuid,
    outcome: &Result<(), anyhow::Error>,
) -> Result<(), anyhow::Error> {
    let (status, failure_reason) = match outcome {
        Ok(()) => (SiteStatus::Active, None),
        Err(e) => {
            tracing::error!(
                error_cause_chain = ?e,
                error.message = %e,
                "Failed to provision site"
            );
            (SiteStatus::Failed, Some(format!("{e:#}")))
        }
    };

    sqlx::query(
        r#"
        UPDATE site_subscriptions
        SET status = $1, failure_reason = $2
        WHERE id = $3
        "#,
    )
    .bind(status.as_str())
    .bind(failure_reason)
    .bind(site_id)
    .execute(db_pool)
    .await
    .context("Failed to update site status")?;

    Ok(())
}

#[tracing::instrument(skip_all)]
async fn delete_task(mut transaction: PgTransaction, site_id: Uuid) -> Result<(), anyhow::Error> {
    let query = sqlx::query(
        r#"
        DELETE FROM site_provisioning_queue
        WHERE site_id = $1
        "#,
    )
    .bind(site_id);

    transaction.execute(query).await?;
    transaction.commit().await?;

    Ok(())
}

#[tracing::instrument(skip(db_pool))]
async fn get_plan_apps(db_pool: &PgPool, plan: &str) -> Result<Vec<String>, anyhow::Error> {
    let apps = sqlx::query_scalar::<_, String>(
        r#"
        SELECT app_name
        FROM subscription_plan_apps
        WHERE plan = $1
        ORDER BY position
        "#,
    )
    .bind(plan)
    .fetch_all(db_pool)
    .await
    .context("Failed to fetch plan apps")?;

    Ok(apps)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    TaskCompleted,
    EmptyQueue,
}
