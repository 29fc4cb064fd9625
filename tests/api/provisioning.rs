use crate::helpers::{create_site_body, TestApp, DOMAIN_SUFFIX};
use serde_json::{json, Value};
use site_creator::provisioning_worker::{try_execute_task, ExecutionOutcome};
use std::{os::unix::fs::PermissionsExt, path::PathBuf};
use uuid::Uuid;
use wiremock::{
    matchers::{any, body_partial_json, method, path},
    Mock, ResponseTemplate,
};

async fn queue_site(app: &TestApp, subdomain: &str) {
    app.post_create_site(&create_site_body(subdomain, "basic", "owner@example.com"))
        .await
        .error_for_status()
        .unwrap();
}

async fn accept_emails(app: &TestApp) {
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
}

async fn accept_dns_records(app: &TestApp, expected_requests: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"type": "A"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected_requests)
        .mount(&app.dns_server)
        .await;
}

async fn sent_emails(app: &TestApp) -> Vec<Value> {
    app.email_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn empty_queue_is_reported() {
    // given
    let app = TestApp::spawn().await;

    // when
    let outcome = try_execute_task(&app.db_pool, &app.provisioner).await;

    // then
    assert_eq!(outcome.unwrap(), ExecutionOutcome::EmptyQueue);
}

#[tokio::test]
async fn successful_provisioning_activates_the_site() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &["erpnext", "hrms"]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 1).await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    assert_eq!(app.site_status("acme").await, ("active".to_string(), None));
    assert_eq!(app.queued_tasks().await, 0);
}

#[tokio::test]
async fn successful_provisioning_sends_the_credentials() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 1).await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let emails = sent_emails(&app).await;
    assert_eq!(emails.len(), 2);
    let complete = &emails[1];
    assert_eq!(complete["Subject"], "Site Creation Complete");
    let text = complete["TextBody"].as_str().unwrap();
    assert!(text.contains(&format!("https://acme.{DOMAIN_SUFFIX}")));
    assert!(text.contains("Username: administrator"));
    let password = text
        .lines()
        .find_map(|line| line.strip_prefix("Password: "))
        .unwrap();
    assert_eq!(password.len(), 16);
}

#[tokio::test]
async fn dns_failure_marks_the_site_as_failed() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&app.dns_server)
        .await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let (status, reason) = app.site_status("acme").await;
    assert_eq!(status, "failed");
    assert!(reason.unwrap().contains("Failed to create DNS record"));
    assert_eq!(app.queued_tasks().await, 0);
    assert_eq!(sent_emails(&app).await.len(), 1);
}

#[tokio::test]
async fn bench_failure_marks_the_site_as_failed() {
    // given
    let app = TestApp::spawn_with_bench("false").await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 1).await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let (status, reason) = app.site_status("acme").await;
    assert_eq!(status, "failed");
    assert!(reason.unwrap().contains("new-site"));
    assert_eq!(sent_emails(&app).await.len(), 1);
}

#[tokio::test]
async fn each_queued_site_is_provisioned_once() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 2).await;
    queue_site(&app, "acme").await;
    queue_site(&app, "globex").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    assert_eq!(app.site_status("acme").await.0, "active");
    assert_eq!(app.site_status("globex").await.0, "active");
    assert_eq!(app.queued_tasks().await, 0);
}

#[tokio::test]
async fn bench_steps_run_in_order_with_plan_apps_in_position_order() {
    // given
    let (script, log) = recording_bench();
    let app = TestApp::spawn_with_bench(script.to_str().unwrap()).await;
    app.create_plan("basic", 1000, &["erpnext", "hrms"]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 1).await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let invocations = std::fs::read_to_string(&log).unwrap();
    let invocations: Vec<&str> = invocations.lines().collect();
    assert_eq!(invocations.len(), 8, "{invocations:?}");

    let new_site: Vec<&str> = invocations[0].split(' ').collect();
    assert_eq!(new_site[..3], ["new-site", "acme.sites.test", "--admin-password"]);
    assert_eq!(new_site[3].len(), 16);
    assert_eq!(new_site[4..], ["--mariadb-root-password", "root"]);

    assert_eq!(
        invocations[1..],
        [
            "--site acme.sites.test install-app erpnext",
            "--site acme.sites.test migrate",
            "--site acme.sites.test install-app hrms",
            "--site acme.sites.test migrate",
            "setup add-domain acme.sites.test",
            "setup nginx --yes",
            "setup reload-nginx",
        ]
    );
    assert_eq!(app.site_status("acme").await.0, "active");
}

#[tokio::test]
async fn undelivered_credentials_mark_the_site_as_failed() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    Mock::given(body_partial_json(json!({"Subject": "Site Creation Started"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(body_partial_json(json!({"Subject": "Site Creation Complete"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;
    accept_dns_records(&app, 1).await;
    queue_site(&app, "acme").await;

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let (status, reason) = app.site_status("acme").await;
    assert_eq!(status, "failed");
    assert!(reason.unwrap().contains("Failed to deliver the site credentials"));
    assert_eq!(app.queued_tasks().await, 0);
}

#[tokio::test]
async fn interrupted_provisioning_is_not_run_again() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 0).await;
    queue_site(&app, "acme").await;
    sqlx::query(
        "UPDATE site_subscriptions SET provisioning_started_at = now() WHERE subdomain = 'acme'",
    )
    .execute(&app.db_pool)
    .await
    .unwrap();

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    let (status, reason) = app.site_status("acme").await;
    assert_eq!(status, "failed");
    assert!(reason.unwrap().contains("interrupted"));
    assert_eq!(app.queued_tasks().await, 0);
    assert_eq!(sent_emails(&app).await.len(), 1);
}

#[tokio::test]
async fn leftover_task_of_an_active_site_is_discarded() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    accept_emails(&app).await;
    accept_dns_records(&app, 0).await;
    queue_site(&app, "acme").await;
    sqlx::query(
        r#"
        UPDATE site_subscriptions
        SET status = 'active', provisioning_started_at = now()
        WHERE subdomain = 'acme'
        "#,
    )
    .execute(&app.db_pool)
    .await
    .unwrap();

    // when
    app.dispatch_all_pending_tasks().await;

    // then
    assert_eq!(app.site_status("acme").await, ("active".to_string(), None));
    assert_eq!(app.queued_tasks().await, 0);
}

/// A bench stand-in that appends each invocation's arguments to a log file.
fn recording_bench() -> (PathBuf, PathBuf) {
    let directory = std::env::temp_dir().join(format!("bench-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&directory).unwrap();
    let script = directory.join("bench");
    let log = directory.join("invocations.log");

    std::fs::write(
        &script,
        format!("#!/bin/sh\necho \"$*\" >> '{}'\n", log.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    (script, log)
}
