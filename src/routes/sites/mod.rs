use crate::{
    app_state::AppState,
    site_creator_client::{CREATE_SITE_PATH, SITE_SUBSCRIPTION_RESOURCE_PATH},
};
use axum::{
    routing::{get, post},
    Router,
};
use create::create_site;
use resource::get_site_subscription;

mod create;
mod resource;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(CREATE_SITE_PATH, post(create_site))
        .route(
            &format!("{SITE_SUBSCRIPTION_RESOURCE_PATH}/:subdomain"),
            get(get_site_subscription),
        )
}
