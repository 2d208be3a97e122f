//! Browser automation capability for the Courier relay agent.
//!
//! The agent never talks to a browser directly. Everything it needs from one
//! is expressed by the [`AutomationDriver`] trait, so the orchestration logic
//! can run against a real W3C WebDriver endpoint ([`WebDriverClient`]) or an
//! in-memory [`SimulatedSite`] in tests.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::Selector;
//! use courier_driver::{AutomationDriver, ChromeOptions, WaitCondition, WebDriverClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = WebDriverClient::connect("http://localhost:9515", &ChromeOptions::default()).await?;
//! driver.navigate("https://forum.example/login").await?;
//!
//! let ready = driver
//!     .wait_for(
//!         &WaitCondition::ElementPresent(Selector::css("#login-button")),
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//! assert!(ready);
//! driver.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
pub mod drivers;

pub use driver::{AutomationDriver, ElementHandle, PageSignal, WaitCondition, condition_met};
pub use drivers::{ChromeOptions, SimulatedPost, SimulatedSite, WebDriverClient};
