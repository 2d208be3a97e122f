//! Concrete automation drivers.

mod simulated;
mod webdriver;

pub use simulated::{SimulatedPost, SimulatedSite};
pub use webdriver::{ChromeOptions, WebDriverClient};
