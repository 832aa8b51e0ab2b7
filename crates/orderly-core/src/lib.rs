//! # orderly-core
//!
//! Core types shared by every orderly crate. This crate has no dependency on
//! the storage layer.
//!
//! ## Modules
//!
//! - [`error`] - Error type and result alias
//! - [`settings`] - Project settings (databases, ordered models, logging)
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{OrderlyError, OrderlyResult};
pub use settings::{DatabaseSettings, OrderedModelSettings, Settings};
