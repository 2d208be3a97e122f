//! In-memory simulated platform for exercising the agent without a browser.

use crate::{AutomationDriver, ElementHandle, PageSignal};
use async_trait::async_trait;
use courier_core::{PageSelectors, Selector};
use courier_error::{DriverError, DriverErrorKind, DriverResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Page elements the simulated site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    LoginEmail,
    LoginPassword,
    LoginSubmit,
    LoginError,
    AuthenticatedMarker,
    NewTopic,
    TitleInput,
    CategoryDropdown,
    CategoryOption,
    BodyInput,
    Submit,
    Confirmation,
}

impl Role {
    fn id(self) -> &'static str {
        match self {
            Self::LoginEmail => "login-email",
            Self::LoginPassword => "login-password",
            Self::LoginSubmit => "login-submit",
            Self::LoginError => "login-error",
            Self::AuthenticatedMarker => "authenticated-marker",
            Self::NewTopic => "new-topic",
            Self::TitleInput => "title-input",
            Self::CategoryDropdown => "category-dropdown",
            Self::CategoryOption => "category-option",
            Self::BodyInput => "body-input",
            Self::Submit => "submit",
            Self::Confirmation => "confirmation",
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        ALL_ROLES.iter().copied().find(|role| role.id() == id)
    }
}

const ALL_ROLES: [Role; 12] = [
    Role::LoginEmail,
    Role::LoginPassword,
    Role::LoginSubmit,
    Role::LoginError,
    Role::AuthenticatedMarker,
    Role::NewTopic,
    Role::TitleInput,
    Role::CategoryDropdown,
    Role::CategoryOption,
    Role::BodyInput,
    Role::Submit,
    Role::Confirmation,
];

/// A post accepted by the simulated site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedPost {
    /// Title typed into the compose form.
    pub title: Option<String>,
    /// Body typed into the compose form.
    pub body: String,
}

#[derive(Debug, Default)]
struct SiteState {
    url: String,
    logged_in: bool,
    login_rejected: bool,
    compose_open: bool,
    fields: HashMap<Role, String>,
    navigations: u32,
    login_attempts: u32,
    submissions: Vec<SimulatedPost>,
    confirmed_posts: u32,
    // Behaviour switches.
    transport_down: bool,
    login_form_broken: bool,
    confirm_submissions: bool,
    pending_expiries: u32,
}

/// Scriptable fake platform implementing [`AutomationDriver`].
///
/// Models a login page and a compose page addressed by the same selector
/// table the agent uses. Failure modes (driver outage, broken login form,
/// unconfirmed submissions, server-side session expiry) can be toggled at any
/// time, and counters expose how the agent drove the site.
///
/// # Examples
///
/// ```
/// use courier_core::PageSelectors;
/// use courier_driver::{AutomationDriver, SimulatedSite};
///
/// # tokio_test::block_on(async {
/// let site = SimulatedSite::new(
///     "https://forum.example/login",
///     "https://forum.example/latest",
///     PageSelectors::default(),
/// )
/// .with_credentials("bot@example.com", "hunter2");
///
/// site.navigate("https://forum.example/login").await.unwrap();
/// assert_eq!(site.navigations(), 1);
/// # });
/// ```
#[derive(Debug)]
pub struct SimulatedSite {
    login_url: String,
    post_url: String,
    email: String,
    password: String,
    selectors: PageSelectors,
    poll_interval: Duration,
    state: Mutex<SiteState>,
}

impl SimulatedSite {
    /// Create a site serving `login_url` and `post_url`.
    pub fn new(
        login_url: impl Into<String>,
        post_url: impl Into<String>,
        selectors: PageSelectors,
    ) -> Self {
        Self {
            login_url: login_url.into(),
            post_url: post_url.into(),
            email: String::new(),
            password: String::new(),
            selectors,
            poll_interval: Duration::from_millis(5),
            state: Mutex::new(SiteState {
                url: "about:blank".to_string(),
                confirm_submissions: true,
                ..SiteState::default()
            }),
        }
    }

    /// Credentials the site accepts.
    pub fn with_credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = email.into();
        self.password = password.into();
        self
    }

    /// Make every driver call fail with a transport error.
    pub fn set_transport_down(&self, down: bool) {
        self.state.lock().transport_down = down;
    }

    /// Hide the login form elements.
    pub fn set_login_form_broken(&self, broken: bool) {
        self.state.lock().login_form_broken = broken;
    }

    /// Whether submissions produce a confirmation signal.
    pub fn set_confirm_submissions(&self, confirm: bool) {
        self.state.lock().confirm_submissions = confirm;
    }

    /// Drop the server-side session on the next `count` visits to the post page.
    pub fn expire_sessions(&self, count: u32) {
        self.state.lock().pending_expiries = count;
    }

    /// Total `navigate` calls.
    pub fn navigations(&self) -> u32 {
        self.state.lock().navigations
    }

    /// Total clicks on the login button.
    pub fn login_attempts(&self) -> u32 {
        self.state.lock().login_attempts
    }

    /// Every post submitted, confirmed or not.
    pub fn submissions(&self) -> Vec<SimulatedPost> {
        self.state.lock().submissions.clone()
    }

    /// Posts that produced a confirmation signal.
    pub fn confirmed_posts(&self) -> u32 {
        self.state.lock().confirmed_posts
    }

    /// Whether the site currently considers the browser logged in.
    pub fn is_logged_in(&self) -> bool {
        self.state.lock().logged_in
    }

    fn role_of(&self, selector: &Selector) -> Option<Role> {
        let s = &self.selectors;
        let fixed = [
            (s.login_email(), Role::LoginEmail),
            (s.login_password(), Role::LoginPassword),
            (s.login_submit(), Role::LoginSubmit),
            (s.login_error(), Role::LoginError),
            (s.authenticated_marker(), Role::AuthenticatedMarker),
            (s.new_topic(), Role::NewTopic),
            (s.title_input(), Role::TitleInput),
            (s.body_input(), Role::BodyInput),
            (s.submit(), Role::Submit),
        ];
        if let Some((_, role)) = fixed.iter().find(|(candidate, _)| *candidate == selector) {
            return Some(*role);
        }
        let optional = [
            (s.category_dropdown(), Role::CategoryDropdown),
            (s.category_option(), Role::CategoryOption),
            (s.confirmation(), Role::Confirmation),
        ];
        optional
            .iter()
            .find(|(candidate, _)| candidate.as_ref() == Some(selector))
            .map(|(_, role)| *role)
    }

    fn is_visible(&self, state: &SiteState, role: Role) -> bool {
        let on_login = state.url == self.login_url;
        let on_post = state.url == self.post_url;
        match role {
            Role::LoginEmail | Role::LoginPassword | Role::LoginSubmit => {
                on_login && !state.login_form_broken
            }
            Role::LoginError => on_login && state.login_rejected,
            Role::AuthenticatedMarker => state.logged_in && !on_login,
            Role::NewTopic => on_post && state.logged_in,
            Role::TitleInput
            | Role::CategoryDropdown
            | Role::CategoryOption
            | Role::BodyInput
            | Role::Submit => on_post && state.logged_in && state.compose_open,
            Role::Confirmation => state.url.starts_with(&format!("{}/t/", self.post_url)),
        }
    }

    fn check_transport(state: &SiteState) -> DriverResult<()> {
        if state.transport_down {
            return Err(DriverError::new(DriverErrorKind::Transport(
                "simulated connection refused".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AutomationDriver for SimulatedSite {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::check_transport(&state)?;
        state.navigations += 1;
        state.compose_open = false;
        state.fields.clear();

        if url == self.post_url && state.logged_in && state.pending_expiries > 0 {
            state.pending_expiries -= 1;
            state.logged_in = false;
        }

        // Anonymous visitors to the post page land on the login form.
        if url == self.post_url && !state.logged_in {
            debug!("Simulated redirect to login");
            state.url = self.login_url.clone();
        } else {
            state.url = url.to_string();
        }
        state.login_rejected = false;
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> DriverResult<Option<ElementHandle>> {
        let state = self.state.lock();
        Self::check_transport(&state)?;
        Ok(self
            .role_of(selector)
            .filter(|role| self.is_visible(&state, *role))
            .map(|role| ElementHandle::new(role.id(), selector.clone())))
    }

    async fn set_value(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::check_transport(&state)?;
        let role = Role::from_id(element.id())
            .filter(|role| self.is_visible(&state, *role))
            .ok_or_else(|| {
                DriverError::new(DriverErrorKind::StaleElement(element.id().to_string()))
            })?;
        state.fields.insert(role, text.to_string());
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock();
        Self::check_transport(&state)?;
        let role = Role::from_id(element.id())
            .filter(|role| self.is_visible(&state, *role))
            .ok_or_else(|| {
                DriverError::new(DriverErrorKind::StaleElement(element.id().to_string()))
            })?;

        match role {
            Role::LoginSubmit => {
                state.login_attempts += 1;
                let email_ok = state.fields.get(&Role::LoginEmail) == Some(&self.email);
                let password_ok = state.fields.get(&Role::LoginPassword) == Some(&self.password);
                if email_ok && password_ok {
                    state.logged_in = true;
                    state.login_rejected = false;
                    state.url = format!("{}/home", self.login_url.trim_end_matches("/login"));
                } else {
                    state.login_rejected = true;
                }
                state.fields.clear();
            }
            Role::NewTopic => state.compose_open = true,
            Role::Submit => {
                let post = SimulatedPost {
                    title: state.fields.get(&Role::TitleInput).cloned(),
                    body: state.fields.get(&Role::BodyInput).cloned().unwrap_or_default(),
                };
                state.submissions.push(post);
                if state.confirm_submissions {
                    state.confirmed_posts += 1;
                    state.url = format!("{}/t/{}", self.post_url, state.confirmed_posts);
                    state.compose_open = false;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn current_page_signal(&self) -> DriverResult<PageSignal> {
        let state = self.state.lock();
        Self::check_transport(&state)?;
        let title = if state.url == self.login_url {
            "Log In"
        } else {
            "Forum"
        };
        Ok(PageSignal::new(state.url.clone(), title))
    }

    async fn close(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.logged_in = false;
        state.url = "about:blank".to_string();
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "simulated"
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
