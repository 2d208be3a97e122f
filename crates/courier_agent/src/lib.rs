//! Scheduled relay agent: fetch generated content and post it to a web
//! platform through browser automation.
//!
//! # Architecture
//!
//! - **SessionManager**: logs in when the session is missing or stale
//! - **ContentSource**: retrieves the next item from the generation service
//! - **Publisher**: fills and submits the compose form, confirms the post
//! - **Scheduler**: runs the three once per interval with bounded retries
//!
//! # Example
//!
//! ```no_run
//! use courier_agent::{AgentContext, HttpContentFetcher, Scheduler};
//! use courier_core::{AgentSettings, Configuration};
//! use courier_driver::{ChromeOptions, WebDriverClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::from_env()?;
//! let settings = AgentSettings::from_env()?;
//! let driver = WebDriverClient::connect(settings.webdriver_url(), &ChromeOptions::default()).await?;
//! let source = HttpContentFetcher::new(config.generation_endpoint(), *settings.fetch_timeout())?;
//!
//! let scheduler = Scheduler::builder()
//!     .context(AgentContext::new(config, settings, Arc::new(driver)))
//!     .source(Arc::new(source))
//!     .build()?;
//!
//! scheduler.run(async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod exit;
mod fetcher;
mod observability;
mod publisher;
mod retry;
mod scheduler;
mod session;
mod stats;

pub use context::AgentContext;
pub use exit::{EXIT_AUTH, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK, exit_status};
pub use fetcher::{ContentSource, HttpContentFetcher, parse_payload};
pub use observability::{LoggingConfig, init_logging};
pub use publisher::{PublishReceipt, Publisher};
pub use retry::RetryPolicy;
pub use scheduler::{Scheduler, SchedulerBuilder, SchedulerState, next_delay};
pub use session::SessionManager;
pub use stats::{CycleStats, CycleStatsSnapshot};
