//! Posting content through the driver.

use crate::AgentContext;
use courier_core::{ContentItem, Selector, SourceReference};
use courier_driver::{ElementHandle, WaitCondition};
use courier_error::{PublishError, PublishErrorKind};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

/// What happened to an item handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PublishReceipt {
    /// Posted and confirmed.
    #[display("published {}", _0)]
    Published(SourceReference),
    /// Identical to the last successful post; nothing was submitted.
    #[display("duplicate of {}", _0)]
    Duplicate(SourceReference),
}

/// Fills and submits the compose form, then confirms the post.
///
/// Remembers the reference of the last confirmed post and refuses to post
/// the same content twice in a row.
#[derive(Debug)]
pub struct Publisher {
    context: AgentContext,
    last_published: Mutex<Option<SourceReference>>,
}

impl Publisher {
    /// Create a publisher with no publishing history.
    pub fn new(context: AgentContext) -> Self {
        Self {
            context,
            last_published: Mutex::new(None),
        }
    }

    /// Reference of the last confirmed post.
    pub fn last_published(&self) -> Option<SourceReference> {
        self.last_published.lock().clone()
    }

    /// Publish `item` unless it repeats the last confirmed post.
    ///
    /// # Errors
    ///
    /// - `SessionExpired` when the platform sends the browser back to login
    /// - `UnconfirmedSubmission` when no confirmation signal appears in time
    /// - `PageStructureChanged` when a compose element is missing
    /// - `DriverUnavailable` when the driver cannot be reached
    #[instrument(skip(self, item), fields(reference = item.source_reference().short()))]
    pub async fn publish(&self, item: &ContentItem) -> Result<PublishReceipt, PublishError> {
        let reference = item.source_reference().clone();
        if self.last_published.lock().as_ref() == Some(&reference) {
            info!("Content identical to last post, skipping");
            return Ok(PublishReceipt::Duplicate(reference));
        }

        self.submit(item).await?;

        *self.last_published.lock() = Some(reference.clone());
        info!("Post confirmed");
        Ok(PublishReceipt::Published(reference))
    }

    async fn submit(&self, item: &ContentItem) -> Result<(), PublishError> {
        let config = self.context.config();
        let settings = self.context.settings();
        let selectors = settings.selectors();
        let driver = self.context.driver();

        driver.navigate(config.post_url()).await?;
        self.check_session().await?;

        let new_topic = self.require(selectors.new_topic(), "new topic button").await?;
        driver.click(&new_topic).await?;

        if let Some(title) = item.title() {
            let input = self.require(selectors.title_input(), "title input").await?;
            driver.set_value(&input, title).await?;
        }

        if let (Some(dropdown), Some(option)) =
            (selectors.category_dropdown(), selectors.category_option())
        {
            let dropdown = self.require(dropdown, "category dropdown").await?;
            driver.click(&dropdown).await?;
            let option = self.require(option, "category option").await?;
            driver.click(&option).await?;
        }

        let body = self.require(selectors.body_input(), "body input").await?;
        driver.set_value(&body, item.body()).await?;

        let before = driver.current_page_signal().await?;
        let submit = self.require(selectors.submit(), "submit button").await?;
        driver.click(&submit).await?;
        debug!("Submitted compose form");

        let confirmation = match selectors.confirmation() {
            Some(selector) => WaitCondition::ElementPresent(selector.clone()),
            None => WaitCondition::UrlChanged {
                from: before.url().clone(),
            },
        };
        let confirmed = driver
            .wait_for(&confirmation, *settings.confirmation_timeout())
            .await?;

        // A URL change back to login is a redirect, not a confirmation.
        if let Some(url) = self.login_shown().await? {
            return Err(PublishError::new(PublishErrorKind::SessionExpired(format!(
                "redirected to login at {} after submit",
                url
            ))));
        }
        if !confirmed {
            let after = driver.current_page_signal().await?;
            warn!(url = %after.url(), "No confirmation signal after submit");
            return Err(PublishError::new(PublishErrorKind::UnconfirmedSubmission(
                format!("{} not observed within timeout", confirmation),
            )));
        }
        Ok(())
    }

    async fn check_session(&self) -> Result<(), PublishError> {
        if let Some(url) = self.login_shown().await? {
            return Err(PublishError::new(PublishErrorKind::SessionExpired(format!(
                "post page showed login at {}",
                url
            ))));
        }
        Ok(())
    }

    /// Current URL when the browser is on the login page or shows its form.
    async fn login_shown(&self) -> Result<Option<String>, PublishError> {
        let driver = self.context.driver();
        let signal = driver.current_page_signal().await?;
        let on_login = is_login_page(signal.url(), self.context.config().login_url());
        let login_form = driver
            .find_element(self.context.settings().selectors().login_email())
            .await?
            .is_some();
        Ok((on_login || login_form).then(|| signal.url().clone()))
    }

    async fn require(&self, selector: &Selector, what: &str) -> Result<ElementHandle, PublishError> {
        let timeout = *self.context.settings().element_timeout();
        self.context
            .driver()
            .wait_for_element(selector, timeout)
            .await?
            .ok_or_else(|| {
                PublishError::new(PublishErrorKind::PageStructureChanged(format!(
                    "{} not found ({})",
                    what, selector
                )))
            })
    }
}

/// Whether `url` is the login page itself, not merely a page beneath it.
///
/// Compares origin and path, ignoring query, fragment and a trailing slash.
fn is_login_page(url: &str, login_url: &str) -> bool {
    match (reqwest::Url::parse(url), reqwest::Url::parse(login_url)) {
        (Ok(current), Ok(login)) => {
            current.origin() == login.origin()
                && current.path().trim_end_matches('/') == login.path().trim_end_matches('/')
        }
        _ => url.trim_end_matches('/') == login_url.trim_end_matches('/'),
    }
}
