//! # orderly-cli
//!
//! Management commands for ordered models stored in SQLite.
//!
//! This crate provides:
//!
//! - **Management commands** - A framework for defining and registering CLI
//!   commands ([`ManagementCommand`], [`CommandRegistry`])
//! - **Built-in commands** - `migrate`, `rebalance`, `showorder`, `reorder`
//!   and `move`, each operating on a model declared under
//!   `[ordered_models.<label>]` in the settings file
//! - **The `orderly` binary** - wires the registry, settings and logging together
//!
//! Every command that writes runs inside a single
//! [`atomic`](orderly_db::transactions::atomic) block.
//!
//! ## Quick Start
//!
//! ```rust
//! use orderly_cli::command::CommandRegistry;
//! use orderly_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert_eq!(names, vec!["migrate", "move", "rebalance", "reorder", "showorder"]);
//! ```

// These clippy lints are intentionally allowed:
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
// - significant_drop_tightening: false positives with async Mutex guards
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::significant_drop_tightening)]

pub mod command;
pub mod commands;

// Re-export primary types at the crate root for convenience.
pub use command::{load_settings, CommandRegistry, ManagementCommand};
