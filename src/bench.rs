use crate::domain::{AdminPassword, SiteName};
use secrecy::{ExposeSecret, Secret};
use std::{path::PathBuf, process::ExitStatus};
use tokio::process::Command;

/// Runs the site management tool. Every invocation gets discrete arguments;
/// nothing goes through a shell.
#[derive(Clone, Debug)]
pub struct Bench {
    command: PathBuf,
    directory: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("Failed to start `{step}`")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{step}` exited with {status}: {stderr}")]
    Failed {
        step: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl Bench {
    pub fn new(command: PathBuf, directory: Option<PathBuf>) -> Self {
        Self { command, directory }
    }

    pub async fn new_site(
        &self,
        site_name: &SiteName,
        admin_password: &AdminPassword,
        mariadb_root_password: &Secret<String>,
    ) -> Result<(), BenchError> {
        self.run(
            "new-site",
            &[
                "new-site",
                site_name.as_ref(),
                "--admin-password",
                admin_password.expose_secret(),
                "--mariadb-root-password",
                mariadb_root_password.expose_secret(),
            ],
        )
        .await
    }

    pub async fn install_app(&self, site_name: &SiteName, app: &str) -> Result<(), BenchError> {
        self.run(
            &format!("install-app {app}"),
            &["--site", site_name.as_ref(), "install-app", app],
        )
        .await
    }

    pub async fn migrate(&self, site_name: &SiteName) -> Result<(), BenchError> {
        self.run("migrate", &["--site", site_name.as_ref(), "migrate"])
            .await
    }

    pub async fn add_domain(&self, site_name: &SiteName) -> Result<(), BenchError> {
        self.run("setup add-domain", &["setup", "add-domain", site_name.as_ref()])
            .await
    }

    pub async fn setup_nginx(&self) -> Result<(), BenchError> {
        self.run("setup nginx", &["setup", "nginx", "--yes"]).await
    }

    pub async fn reload_nginx(&self) -> Result<(), BenchError> {
        self.run("setup reload-nginx", &["setup", "reload-nginx"])
            .await
    }

    /// `step` names the invocation in logs and errors; `args` may carry
    /// secrets and are never logged.
    #[tracing::instrument(name = "Run bench", skip(self, args))]
    async fn run(&self, step: &str, args: &[&str]) -> Result<(), BenchError> {
        let mut command = Command::new(&self.command);
        command.args(args).kill_on_drop(true);
        if let Some(directory) = &self.directory {
            command.current_dir(directory);
        }

        let output = command.output().await.map_err(|source| BenchError::Spawn {
            step: step.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(BenchError::Failed {
                step: step.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
