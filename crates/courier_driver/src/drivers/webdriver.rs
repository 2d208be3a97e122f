//! W3C WebDriver client (chromedriver, geckodriver, Selenium grid).

use crate::{AutomationDriver, ElementHandle, PageSignal};
use async_trait::async_trait;
use courier_core::Selector;
use courier_error::{DriverError, DriverErrorKind, DriverResult};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Browser launch options sent with the new-session request.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct ChromeOptions {
    /// Command-line switches for the browser.
    args: Vec<String>,
    /// Page load timeout applied by the browser.
    page_load_timeout: Duration,
    /// Timeout for each HTTP call to the driver.
    request_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            args: [
                "--headless",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--disable-extensions",
                "--disable-software-rasterizer",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            page_load_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ChromeOptions {
    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Add a browser switch.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": self.args },
                    "timeouts": {
                        "pageLoad": self.page_load_timeout.as_millis() as u64,
                        "script": self.page_load_timeout.as_millis() as u64,
                        "implicit": 0
                    }
                }
            }
        })
    }
}

/// One WebDriver browser session.
#[derive(Debug)]
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverClient {
    /// Start a new browser session at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the endpoint is unreachable and a
    /// protocol error if the session cannot be created.
    #[instrument(skip(options))]
    pub async fn connect(base_url: &str, options: &ChromeOptions) -> DriverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| DriverError::new(DriverErrorKind::Transport(e.to_string())))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let response = send(
            &http,
            Method::POST,
            &format!("{}/session", base_url),
            Some(options.capabilities()),
        )
        .await?;

        let session_id = response
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DriverError::new(DriverErrorKind::Protocol(
                    "New session response has no sessionId".to_string(),
                ))
            })?
            .to_string();

        info!(session_id = %session_id, "WebDriver session started");
        Ok(Self {
            http,
            base_url,
            session_id,
            poll_interval: Duration::from_millis(250),
        })
    }

    /// Override the delay between condition polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Session id assigned by the driver.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> DriverResult<Value> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        send(&self.http, method, &url, body).await
    }
}

fn locator(selector: &Selector) -> Value {
    match selector {
        Selector::Css(value) => json!({ "using": "css selector", "value": value }),
        Selector::Xpath(value) => json!({ "using": "xpath", "value": value }),
    }
}

/// Issue one WebDriver call and unwrap its `value` member.
async fn send(
    http: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> DriverResult<Value> {
    debug!(%method, url, "WebDriver command");

    let mut request = http.request(method, url);
    // POST endpoints require a JSON body even when they take no parameters.
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            DriverError::new(DriverErrorKind::Timeout(e.to_string()))
        } else {
            DriverError::new(DriverErrorKind::Transport(e.to_string()))
        }
    })?;

    let status = response.status();
    let payload: Value = response.json().await.map_err(|e| {
        DriverError::new(DriverErrorKind::Protocol(format!(
            "Unreadable response (HTTP {}): {}",
            status, e
        )))
    })?;
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    Err(classify_failure(status, &value))
}

/// Map a W3C error response to a driver error kind.
fn classify_failure(status: StatusCode, value: &Value) -> DriverError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let detail = format!("{} (HTTP {}): {}", code, status.as_u16(), message);

    let kind = match code {
        "no such element" => DriverErrorKind::ElementNotFound(detail),
        "stale element reference" | "element not interactable" => {
            DriverErrorKind::StaleElement(detail)
        }
        "timeout" | "script timeout" => DriverErrorKind::Timeout(detail),
        "invalid session id" | "session not created" | "no such window" => {
            DriverErrorKind::Transport(detail)
        }
        _ => DriverErrorKind::Protocol(detail),
    };
    DriverError::new(kind)
}

#[async_trait]
impl AutomationDriver for WebDriverClient {
    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn find_element(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>> {
        let found = self
            .command(Method::POST, "/element", Some(locator(selector)))
            .await;

        match found {
            Ok(value) => {
                let id = value.get(ELEMENT_KEY).and_then(Value::as_str).ok_or_else(|| {
                    DriverError::new(DriverErrorKind::Protocol(
                        "Element response has no element reference".to_string(),
                    ))
                })?;
                Ok(Some(ElementHandle::new(id, selector.clone())))
            }
            Err(e) if matches!(e.kind, DriverErrorKind::ElementNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, element, text), fields(selector = %element.selector(), chars = text.len()))]
    async fn set_value(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let path = format!("/element/{}", element.id());
        self.command(Method::POST, &format!("{}/clear", path), Some(json!({})))
            .await?;
        self.command(
            Method::POST,
            &format!("{}/value", path),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self, element), fields(selector = %element.selector()))]
    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element.id()),
            Some(json!({})),
        )
        .await
        .map(|_| ())
    }

    async fn current_page_signal(&self) -> DriverResult<PageSignal> {
        let url = self.command(Method::GET, "/url", None).await?;
        let title = self.command(Method::GET, "/title", None).await?;
        Ok(PageSignal::new(
            url.as_str().unwrap_or_default(),
            title.as_str().unwrap_or_default(),
        ))
    }

    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn close(&self) -> DriverResult<()> {
        match self.command(Method::DELETE, "", None).await {
            Ok(_) => {
                info!("WebDriver session closed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to close WebDriver session");
                Err(e)
            }
        }
    }

    fn driver_name(&self) -> &str {
        "webdriver"
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_element_maps_to_not_found() {
        let err = classify_failure(
            StatusCode::NOT_FOUND,
            &json!({ "error": "no such element", "message": "Unable to locate" }),
        );
        assert!(matches!(err.kind, DriverErrorKind::ElementNotFound(_)));
    }

    #[test]
    fn test_invalid_session_is_transport() {
        let err = classify_failure(
            StatusCode::NOT_FOUND,
            &json!({ "error": "invalid session id", "message": "gone" }),
        );
        assert!(err.kind.is_transport());
    }

    #[test]
    fn test_unknown_error_is_protocol() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, &json!({}));
        assert!(matches!(err.kind, DriverErrorKind::Protocol(_)));
    }

    #[test]
    fn test_capabilities_carry_headless_flags() {
        let caps = ChromeOptions::default().capabilities();
        let args = &caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert!(
            args.as_array()
                .expect("args array")
                .iter()
                .any(|a| a == "--headless")
        );
    }

    #[test]
    fn test_extra_switches_are_appended() {
        let caps = ChromeOptions::default()
            .with_arg("--window-size=1280,800")
            .capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .expect("args array")
            .clone();
        assert_eq!(args.last(), Some(&json!("--window-size=1280,800")));
        assert!(args.iter().any(|a| a == "--headless"));
    }
}
