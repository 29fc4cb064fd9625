pub mod app_state;
pub mod bench;
pub mod configuration;
pub mod dns_client;
pub mod domain;
pub mod email_client;
pub mod provisioning_worker;
pub mod routes;
pub mod site_creator_client;
pub mod startup;
pub mod telemetry;
pub mod trigger;
