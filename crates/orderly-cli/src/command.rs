//! Management command framework for orderly.
//!
//! This module provides the [`ManagementCommand`] trait for defining CLI commands
//! and [`CommandRegistry`] for registering and dispatching them.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use orderly_cli::command::ManagementCommand;
//! use orderly_core::{OrderlyResult, Settings};
//!
//! struct ListModelsCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for ListModelsCommand {
//!     fn name(&self) -> &str { "listmodels" }
//!     fn help(&self) -> &str { "List ordered models" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> OrderlyResult<()> {
//!         for label in settings.ordered_models.keys() {
//!             println!("{label}");
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use orderly_core::{settings_loader, OrderlyError, OrderlyResult, Settings};

/// A management command that can be registered and invoked through the CLI.
///
/// Implementations define a name, help text, optional arguments, and an
/// async handler. All commands must be `Send + Sync`.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &str;

    /// Returns a short help description for this command.
    fn help(&self) -> &str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()>;
}

/// A registry of management commands.
///
/// Commands are registered by name and can be looked up, listed, or executed.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a management command.
    ///
    /// If a command with the same name already exists, it is replaced.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        let name = command.name().to_string();
        self.commands.insert(name, command);
    }

    /// Returns a reference to the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns a sorted list of all registered command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with every registered subcommand.
    ///
    /// The global `--settings` option names a TOML or JSON settings file.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("orderly")
            .about("Maintain ordering keys of ordered models")
            .subcommand_required(true)
            .arg(
                clap::Arg::new("settings")
                    .long("settings")
                    .global(true)
                    .value_name("FILE")
                    .help("Settings file (.toml or .json); defaults plus ORDERLY_* variables when omitted"),
            );

        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by_key(|(name, _)| (*name).clone());

        for (name, cmd) in entries {
            // clap wants &'static str names; commands are registered once at startup.
            let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
            let subcmd = clap::Command::new(static_name).about(cmd.help().to_string());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }

        app
    }

    /// Dispatches to the subcommand named in `matches`.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            OrderlyError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self
            .get(name)
            .ok_or_else(|| OrderlyError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!("Running command '{name}'");
        cmd.handle(sub_matches, settings).await
    }
}

/// Loads settings from the `--settings` file, or from defaults and the
/// environment when the option is absent.
pub fn load_settings(matches: &clap::ArgMatches) -> OrderlyResult<Settings> {
    matches
        .get_one::<String>("settings")
        .map_or_else(|| Ok(settings_loader::from_env()), settings_loader::from_file_with_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCommand {
        cmd_name: String,
    }

    impl TestCommand {
        fn new(name: &str) -> Self {
            Self {
                cmd_name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl ManagementCommand for TestCommand {
        fn name(&self) -> &str {
            &self.cmd_name
        }

        fn help(&self) -> &'static str {
            "A test command"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue),
            )
        }

        async fn handle(&self, _matches: &clap::ArgMatches, _settings: &Settings) -> OrderlyResult<()> {
            Ok(())
        }
    }

    struct FailingCommand;

    #[async_trait]
    impl ManagementCommand for FailingCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn help(&self) -> &'static str {
            "A command that always fails"
        }

        async fn handle(&self, _matches: &clap::ArgMatches, _settings: &Settings) -> OrderlyResult<()> {
            Err(OrderlyError::Usage("deliberate failure".to_string()))
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        registry.register(Box::new(TestCommand::new("test")));
        assert_eq!(registry.len(), 1);

        let cmd = registry.get("test").unwrap();
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.help(), "A test command");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_list_commands_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("showorder")));
        registry.register(Box::new(TestCommand::new("move")));
        registry.register(Box::new(TestCommand::new("rebalance")));
        assert_eq!(registry.list_commands(), vec!["move", "rebalance", "showorder"]);
    }

    #[test]
    fn test_build_cli_with_arguments() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["orderly", "test", "--verbose"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "test");
        assert!(sub_matches.get_flag("verbose"));
    }

    #[test]
    fn test_settings_flag_is_global() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["orderly", "test", "--settings", "orderly.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("settings").map(String::as_str),
            Some("orderly.toml")
        );
    }

    #[test]
    fn test_subcommand_required() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        assert!(registry.build_cli().try_get_matches_from(["orderly"]).is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orderly.toml");
        std::fs::write(&path, "ordering_gap = 40\n").unwrap();

        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        let matches = registry
            .build_cli()
            .try_get_matches_from(["orderly", "--settings", path.to_str().unwrap(), "test"])
            .unwrap();
        assert_eq!(load_settings(&matches).unwrap().ordering_gap, 40);
    }

    #[tokio::test]
    async fn test_execute_success_and_failure() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        registry.register(Box::new(FailingCommand));
        let settings = Settings::default();

        let ok = registry
            .build_cli()
            .try_get_matches_from(["orderly", "test"])
            .unwrap();
        assert!(registry.execute(&ok, &settings).await.is_ok());

        let fail = registry
            .build_cli()
            .try_get_matches_from(["orderly", "fail"])
            .unwrap();
        assert!(registry.execute(&fail, &settings).await.unwrap_err().is_usage());
    }
}
