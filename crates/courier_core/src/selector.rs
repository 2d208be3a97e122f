//! Element selectors for the login and posting pages.

use courier_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to locate an element on the page.
///
/// Serialized externally tagged, so a TOML override reads
/// `submit = { xpath = "//button[@type='submit']" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector.
    #[display("css:{}", _0)]
    Css(String),
    /// XPath expression.
    #[display("xpath:{}", _0)]
    Xpath(String),
}

impl Selector {
    /// CSS selector.
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    /// XPath expression.
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::Xpath(value.into())
    }
}

/// Selector table describing the platform's login and compose pages.
///
/// Defaults match a Discourse forum. Any subset can be overridden from a
/// TOML file; missing keys keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default, deny_unknown_fields)]
pub struct PageSelectors {
    /// Email / username input on the login page.
    login_email: Selector,
    /// Password input on the login page.
    login_password: Selector,
    /// Login submit button.
    login_submit: Selector,
    /// Element shown when the platform rejects the credentials.
    login_error: Selector,
    /// Element present only for a logged-in user.
    authenticated_marker: Selector,
    /// Button that opens the compose form.
    new_topic: Selector,
    /// Title input in the compose form.
    title_input: Selector,
    /// Optional category dropdown opened before choosing a category.
    category_dropdown: Option<Selector>,
    /// Optional category entry clicked after opening the dropdown.
    category_option: Option<Selector>,
    /// Body text area in the compose form.
    body_input: Selector,
    /// Button that submits the post.
    submit: Selector,
    /// Element confirming a successful post. When unset, a URL change away
    /// from the compose page is the confirmation signal.
    confirmation: Option<Selector>,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            login_email: Selector::css("#login-account-name"),
            login_password: Selector::css("#login-account-password"),
            login_submit: Selector::css("#login-button"),
            login_error: Selector::css("#modal-alert.alert-error"),
            authenticated_marker: Selector::css("#current-user"),
            new_topic: Selector::xpath("//span[contains(text(), 'New Topic')]"),
            title_input: Selector::xpath(
                "//input[@aria-label='What is this discussion about in one brief sentence?']",
            ),
            category_dropdown: None,
            category_option: None,
            body_input: Selector::xpath(
                "//textarea[@aria-label='Type here. Use Markdown, BBCode, or HTML to format. Drag or paste images.']",
            ),
            submit: Selector::xpath("//*[@id='reply-control']/div[3]/div[3]/div[1]/button"),
            confirmation: None,
        }
    }
}

impl PageSelectors {
    /// Load selector overrides from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(ConfigErrorKind::SelectorFile(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        })?;
        Self::from_toml(&content)
    }

    /// Parse selector overrides from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| {
            ConfigError::new(ConfigErrorKind::SelectorFile(format!(
                "Failed to parse selectors: {}",
                e
            )))
        })
    }

    /// Override the confirmation selector.
    pub fn with_confirmation(mut self, selector: Selector) -> Self {
        self.confirmation = Some(selector);
        self
    }

    /// Override the category selection pair.
    pub fn with_category(mut self, dropdown: Selector, option: Selector) -> Self {
        self.category_dropdown = Some(dropdown);
        self.category_option = Some(option);
        self
    }
}
