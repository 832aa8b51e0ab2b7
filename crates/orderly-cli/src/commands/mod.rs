//! Built-in management commands.
//!
//! Each command implements [`ManagementCommand`](crate::command::ManagementCommand)
//! and exposes its work as a plain async function taking a
//! [`DbExecutor`], so it can be driven without going through clap.

pub mod migrate;
pub mod move_cmd;
pub mod rebalance;
pub mod reorder;
pub mod showorder;

pub use migrate::MigrateCommand;
pub use move_cmd::{MoveCommand, MoveTarget};
pub use rebalance::RebalanceCommand;
pub use reorder::ReorderCommand;
pub use showorder::ShoworderCommand;

use crate::command::CommandRegistry;
use orderly_core::{OrderlyError, OrderlyResult, Settings};
use orderly_db::{GroupKey, OrderingMeta};
use orderly_db_backends::SqliteBackend;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(MigrateCommand));
    registry.register(Box::new(RebalanceCommand));
    registry.register(Box::new(ShoworderCommand));
    registry.register(Box::new(ReorderCommand));
    registry.register(Box::new(MoveCommand));
}

// ── Shared arguments ──────────────────────────────────────────────────

fn model_arg() -> clap::Arg {
    clap::Arg::new("model")
        .long("model")
        .required(true)
        .help("Label of an ordered model declared under [ordered_models]")
}

fn group_arg() -> clap::Arg {
    clap::Arg::new("group")
        .long("group")
        .num_args(1..)
        .action(clap::ArgAction::Append)
        .value_name("FIELD=VALUE")
        .help("Value of an order-within field; give one per field")
}

fn database_arg() -> clap::Arg {
    clap::Arg::new("database")
        .long("database")
        .default_value("default")
        .help("Database alias")
}

fn id_arg() -> clap::Arg {
    clap::Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help("Id of the record to move")
}

// ── Shared lookups ────────────────────────────────────────────────────

/// Resolves `--model` against the settings.
fn model_meta(matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<OrderingMeta> {
    let label = matches
        .get_one::<String>("model")
        .ok_or_else(|| OrderlyError::Usage("--model is required".to_string()))?;
    OrderingMeta::from_settings(label, settings)
}

/// Builds the group key from `--group` assignments, if any were given.
fn group_key(matches: &clap::ArgMatches, meta: &OrderingMeta) -> OrderlyResult<Option<GroupKey>> {
    let Some(items) = matches.get_many::<String>("group") else {
        return Ok(None);
    };
    let items: Vec<&String> = items.collect();
    let parsed = GroupKey::parse_assignments(&items)?;
    meta.align_group_key(&parsed).map(Some)
}

/// Opens the database named by `--database`.
fn open_database(matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<SqliteBackend> {
    let alias = matches
        .get_one::<String>("database")
        .map_or("default", String::as_str);
    let db = settings.database(alias).ok_or_else(|| {
        OrderlyError::ConfigurationError(format!("No database configured under '{alias}'"))
    })?;
    SqliteBackend::from_settings(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> clap::ArgMatches {
        clap::Command::new("t")
            .arg(model_arg())
            .arg(group_arg())
            .arg(database_arg())
            .try_get_matches_from(args)
            .unwrap()
    }

    fn settings() -> Settings {
        orderly_core::settings_loader::from_toml_str(
            r#"
            [ordered_models.slide]
            db_table = "slide"
            order_within_fields = ["deck_id", "lang"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_register_builtin_commands() {
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry);
        assert_eq!(registry.len(), 5);
        assert!(registry.get("move").is_some());
    }

    #[test]
    fn test_group_key_from_assignments() {
        let settings = settings();
        let matches = parse(&["t", "--model", "slide", "--group", "lang=en", "deck_id=4"]);
        let meta = model_meta(&matches, &settings).unwrap();
        let key = group_key(&matches, &meta).unwrap().unwrap();
        assert_eq!(key.to_string(), "deck_id=4, lang=en");
    }

    #[test]
    fn test_group_key_absent() {
        let settings = settings();
        let matches = parse(&["t", "--model", "slide"]);
        let meta = model_meta(&matches, &settings).unwrap();
        assert!(group_key(&matches, &meta).unwrap().is_none());
    }

    #[test]
    fn test_unknown_model_and_database() {
        let settings = settings();
        let matches = parse(&["t", "--model", "nope"]);
        assert!(matches!(
            model_meta(&matches, &settings),
            Err(OrderlyError::ConfigurationError(_))
        ));

        let matches = parse(&["t", "--model", "slide", "--database", "replica"]);
        assert!(matches!(
            open_database(&matches, &settings),
            Err(OrderlyError::ConfigurationError(_))
        ));
    }
}
