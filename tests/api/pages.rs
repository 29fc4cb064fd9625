use crate::helpers::{create_site_body, TestApp};
use wiremock::{matchers::any, Mock, ResponseTemplate};

#[tokio::test]
async fn plans_page_lists_every_plan_with_its_price() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    app.create_plan("business", 4999, &["erpnext"]).await;

    // when
    let html = app.get_plans_html().await;

    // then
    assert!(html.contains("basic plan"));
    assert!(html.contains("10.00"));
    assert!(html.contains("business plan"));
    assert!(html.contains("49.99"));
}

#[tokio::test]
async fn plans_page_handles_an_empty_catalogue() {
    // given
    let app = TestApp::spawn().await;

    // when
    let html = app.get_plans_html().await;

    // then
    assert!(html.contains("No plans are available yet."));
}

#[tokio::test]
async fn sites_page_lists_created_sites_and_their_status() {
    // given
    let app = TestApp::spawn().await;
    app.create_plan("basic", 1000, &[]).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
    app.post_create_site(&create_site_body("acme", "basic", "owner@example.com"))
        .await;

    // when
    let html = app.get_my_sites_html().await;

    // then
    assert!(html.contains("<td>acme</td>"));
    assert!(html.contains("<td>basic</td>"));
    assert!(html.contains("<td>pending</td>"));
}

#[tokio::test]
async fn plans_page_returns_500_when_plans_cannot_be_loaded() {
    // given
    let app = TestApp::spawn().await;
    sqlx::query("ALTER TABLE subscription_plans DROP COLUMN price_cents;")
        .execute(&app.db_pool)
        .await
        .unwrap();

    // when
    let response = app.get("/plans").await;

    // then
    assert_eq!(response.status(), 500);
}
