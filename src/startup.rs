use crate::{
    app_state::AppState,
    configuration::{DatabaseSettings, Settings},
    routes::{health_check, pages, sites},
    telemetry::{record_response, request_span, RequestUuid, REQUEST_ID_HEADER},
};
use axum::{http::HeaderName, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address).await?;

        let app_state = AppState {
            db_pool: get_connection_pool(&config.database),
            email_client: config.email_client.client()?,
            provisioning: config.provisioning,
        };

        Ok(Self {
            listener,
            router: router(app_state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await
    }
}

pub fn get_connection_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(config.with_db())
}

fn router(app_state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(health_check::router())
        .merge(sites::router())
        .merge(pages::router())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), RequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_span)
                        .on_response(record_response),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .with_state(app_state)
}
