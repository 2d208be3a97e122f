//! Automation driver trait and wait conditions.

use async_trait::async_trait;
use courier_core::Selector;
use courier_error::DriverResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Opaque reference to an element located on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct ElementHandle {
    /// Driver-assigned element id.
    id: String,
    /// Selector that located the element.
    selector: Selector,
}

impl ElementHandle {
    /// Wrap a driver element id.
    pub fn new(id: impl Into<String>, selector: Selector) -> Self {
        Self {
            id: id.into(),
            selector,
        }
    }
}

/// Observable page state used to detect navigation and redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PageSignal {
    /// Current URL.
    url: String,
    /// Document title.
    title: String,
}

impl PageSignal {
    /// Build a page signal.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// A page condition that a bounded wait polls for.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum WaitCondition {
    /// An element matching the selector exists.
    #[display("element present: {}", _0)]
    ElementPresent(Selector),
    /// The URL differs from `from`.
    #[display("url changed from {}", from)]
    UrlChanged {
        /// URL observed before the action.
        from: String,
    },
    /// The URL contains the fragment.
    #[display("url contains {}", _0)]
    UrlContains(String),
    /// Any of the nested conditions holds.
    #[display("any of {} conditions", _0.len())]
    AnyOf(Vec<WaitCondition>),
}

/// Evaluate a condition once against the current page.
pub async fn condition_met<D>(driver: &D, condition: &WaitCondition) -> DriverResult<bool>
where
    D: AutomationDriver + ?Sized,
{
    let mut pending = vec![condition];
    let mut signal: Option<PageSignal> = None;

    while let Some(next) = pending.pop() {
        match next {
            WaitCondition::AnyOf(nested) => pending.extend(nested.iter()),
            WaitCondition::ElementPresent(selector) => {
                if driver.find_element(selector).await?.is_some() {
                    return Ok(true);
                }
            }
            WaitCondition::UrlChanged { from } => {
                if signal.is_none() {
                    signal = Some(driver.current_page_signal().await?);
                }
                if signal.as_ref().is_some_and(|s| s.url() != from) {
                    return Ok(true);
                }
            }
            WaitCondition::UrlContains(fragment) => {
                if signal.is_none() {
                    signal = Some(driver.current_page_signal().await?);
                }
                if signal.as_ref().is_some_and(|s| s.url().contains(fragment.as_str())) {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}

/// Capability set the agent needs from a browser session.
///
/// Every method is a bounded operation: implementations apply their own
/// request timeouts, and the provided waits stop at their deadline.
/// A driver represents one exclusive browser session and must not be shared
/// between concurrently running cycles.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Load a URL in the current tab.
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Locate an element, returning `None` when nothing matches.
    async fn find_element(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>>;

    /// Replace the element's value with `text`.
    async fn set_value(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Click the element.
    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Current URL and title.
    async fn current_page_signal(&self) -> DriverResult<PageSignal>;

    /// End the browser session.
    async fn close(&self) -> DriverResult<()>;

    /// Short name used in logs.
    fn driver_name(&self) -> &str;

    /// Delay between polls in [`wait_for`](AutomationDriver::wait_for).
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(250)
    }

    /// Poll `condition` until it holds or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout; errors only on driver failure.
    async fn wait_for(&self, condition: &WaitCondition, timeout: Duration) -> DriverResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if condition_met(self, condition).await? {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(%condition, ?timeout, "Wait condition timed out");
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval().min(deadline - now)).await;
        }
    }

    /// Poll for an element until it appears or `timeout` elapses.
    async fn wait_for_element(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> DriverResult<Option<ElementHandle>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find_element(selector).await? {
                return Ok(Some(element));
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(%selector, ?timeout, "Element did not appear");
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval().min(deadline - now)).await;
        }
    }
}
