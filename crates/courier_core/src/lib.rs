//! Core data types for the Courier relay agent.
//!
//! This crate provides the immutable configuration, the session record owned
//! by the session manager, the content items passed from fetcher to
//! publisher, and the per-cycle results reported by the scheduler.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod content;
mod cycle;
mod selector;
mod session;
mod settings;

pub use config::{Configuration, ConfigurationBuilder, MAX_INTERVAL_MINUTES, Secret, env_keys};
pub use content::{ContentItem, SourceReference};
pub use cycle::{CycleOutcome, CycleResult};
pub use selector::{PageSelectors, Selector};
pub use session::{Session, SessionStatus};
pub use settings::{AgentSettings, AgentSettingsBuilder};
