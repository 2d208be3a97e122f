//! Tests for the simulated site and the provided wait operations.

use courier_core::PageSelectors;
use courier_driver::{AutomationDriver, SimulatedSite, WaitCondition};
use std::time::Duration;

const LOGIN: &str = "https://forum.example/login";
const POST: &str = "https://forum.example/latest";

fn site() -> (SimulatedSite, PageSelectors) {
    let selectors = PageSelectors::default();
    let site = SimulatedSite::new(LOGIN, POST, selectors.clone())
        .with_credentials("bot@example.com", "hunter2");
    (site, selectors)
}

async fn log_in(site: &SimulatedSite, selectors: &PageSelectors, password: &str) {
    site.navigate(LOGIN).await.expect("Navigate");
    let email = site.find_element(selectors.login_email()).await.unwrap().unwrap();
    let pass = site.find_element(selectors.login_password()).await.unwrap().unwrap();
    let submit = site.find_element(selectors.login_submit()).await.unwrap().unwrap();
    site.set_value(&email, "bot@example.com").await.unwrap();
    site.set_value(&pass, password).await.unwrap();
    site.click(&submit).await.unwrap();
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let (site, selectors) = site();
    log_in(&site, &selectors, "hunter2").await;

    assert!(site.is_logged_in());
    let marker = WaitCondition::ElementPresent(selectors.authenticated_marker().clone());
    assert!(site.wait_for(&marker, Duration::from_millis(50)).await.unwrap());
}

#[tokio::test]
async fn test_login_rejection_shows_error() {
    let (site, selectors) = site();
    log_in(&site, &selectors, "wrong").await;

    assert!(!site.is_logged_in());
    assert!(site.find_element(selectors.login_error()).await.unwrap().is_some());
    assert_eq!(site.login_attempts(), 1);
}

#[tokio::test]
async fn test_anonymous_post_page_redirects_to_login() {
    let (site, _) = site();
    site.navigate(POST).await.unwrap();
    let signal = site.current_page_signal().await.unwrap();
    assert_eq!(signal.url(), LOGIN);
}

#[tokio::test]
async fn test_transport_outage() {
    let (site, _) = site();
    site.set_transport_down(true);
    let err = site.navigate(LOGIN).await.unwrap_err();
    assert!(err.kind.is_transport());
    assert_eq!(site.navigations(), 0);
}

#[tokio::test]
async fn test_wait_for_element_times_out_on_broken_form() {
    let (site, selectors) = site();
    site.set_login_form_broken(true);
    site.navigate(LOGIN).await.unwrap();

    let found = site
        .wait_for_element(selectors.login_email(), Duration::from_millis(30))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_any_of_condition() {
    let (site, selectors) = site();
    log_in(&site, &selectors, "wrong").await;

    let either = WaitCondition::AnyOf(vec![
        WaitCondition::ElementPresent(selectors.authenticated_marker().clone()),
        WaitCondition::ElementPresent(selectors.login_error().clone()),
    ]);
    assert!(site.wait_for(&either, Duration::from_millis(50)).await.unwrap());
}

#[tokio::test]
async fn test_submission_confirmation_changes_url() {
    let (site, selectors) = site();
    log_in(&site, &selectors, "hunter2").await;
    site.navigate(POST).await.unwrap();

    let new_topic = site.find_element(selectors.new_topic()).await.unwrap().unwrap();
    site.click(&new_topic).await.unwrap();
    let body = site.find_element(selectors.body_input()).await.unwrap().unwrap();
    site.set_value(&body, "Hello").await.unwrap();
    let submit = site.find_element(selectors.submit()).await.unwrap().unwrap();
    site.click(&submit).await.unwrap();

    let changed = WaitCondition::UrlChanged {
        from: POST.to_string(),
    };
    assert!(site.wait_for(&changed, Duration::from_millis(50)).await.unwrap());
    assert_eq!(site.confirmed_posts(), 1);
    assert_eq!(site.submissions()[0].body, "Hello");
}

#[tokio::test]
async fn test_url_contains_matches_topic_page() {
    let (site, selectors) = site();
    log_in(&site, &selectors, "hunter2").await;
    site.navigate(POST).await.unwrap();

    let topic = WaitCondition::UrlContains("/t/".to_string());
    assert!(!site.wait_for(&topic, Duration::from_millis(20)).await.unwrap());

    let new_topic = site.find_element(selectors.new_topic()).await.unwrap().unwrap();
    site.click(&new_topic).await.unwrap();
    let body = site.find_element(selectors.body_input()).await.unwrap().unwrap();
    site.set_value(&body, "Hello").await.unwrap();
    let submit = site.find_element(selectors.submit()).await.unwrap().unwrap();
    site.click(&submit).await.unwrap();

    assert!(site.wait_for(&topic, Duration::from_millis(50)).await.unwrap());
}
