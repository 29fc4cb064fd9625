use crate::helpers::{create_site_body, TestApp};
use serde_json::Value;
use wiremock::{matchers::any, Mock, ResponseTemplate};

#[tokio::test]
async fn resource_returns_the_saved_subscription() {
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
    let response = app.get_site_subscription("acme").await;

    // then
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["subdomain"], "acme");
    assert_eq!(body["data"]["plan"], "basic");
    assert_eq!(body["data"]["email"], "owner@example.com");
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["failure_reason"].is_null());
}

#[tokio::test]
async fn resource_returns_a_404_for_unknown_subdomains() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get_site_subscription("nobody").await;

    // then
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["exc_type"], "DoesNotExistError");
    assert_eq!(body["message"], "Site Subscription nobody not found");
}

#[tokio::test]
async fn resource_returns_a_400_for_invalid_subdomains() {
    // given
    let app = TestApp::spawn().await;

    // when
    let response = app.get_site_subscription("Not-Valid").await;

    // then
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["exc_type"], "ValidationError");
}
