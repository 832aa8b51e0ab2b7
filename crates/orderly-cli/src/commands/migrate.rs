//! The `migrate` management command.
//!
//! Creates the table and group index of every ordered model declared in the
//! settings, or of one model with `--model`. Existing tables are left alone.

use async_trait::async_trait;
use orderly_core::{OrderlyError, OrderlyResult, Settings};
use orderly_db::{atomic, DbExecutor, OrderingMeta, SqlRecordStore};

use super::{database_arg, open_database};
use crate::command::ManagementCommand;

/// Ensures the tables of ordered models exist.
pub struct MigrateCommand;

/// Creates the table and index for each model in `models`.
///
/// Returns the number of models processed.
pub async fn ensure_tables(db: &dyn DbExecutor, models: Vec<OrderingMeta>) -> OrderlyResult<usize> {
    atomic(db, |txn| async move {
        for meta in &models {
            SqlRecordStore::new(txn.as_ref(), meta.clone())
                .create_table()
                .await?;
            tracing::info!("Ensured table '{}'", meta.db_table);
        }
        Ok(models.len())
    })
    .await
}

/// Resolves the models to migrate, sorted by label.
fn selected_models(label: Option<&String>, settings: &Settings) -> OrderlyResult<Vec<OrderingMeta>> {
    if let Some(label) = label {
        return Ok(vec![OrderingMeta::from_settings(label, settings)?]);
    }
    let mut labels: Vec<&String> = settings.ordered_models.keys().collect();
    labels.sort();
    labels
        .into_iter()
        .map(|label| OrderingMeta::from_settings(label, settings))
        .collect()
}

#[async_trait]
impl ManagementCommand for MigrateCommand {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn help(&self) -> &'static str {
        "Create tables for ordered models"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("model")
                .long("model")
                .help("Only migrate this model (default: every declared model)"),
        )
        .arg(database_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let models = selected_models(matches.get_one::<String>("model"), settings)?;
        if models.is_empty() {
            return Err(OrderlyError::ConfigurationError(
                "No ordered models declared in settings".to_string(),
            ));
        }
        let backend = open_database(matches, settings)?;
        let count = ensure_tables(&backend, models).await?;
        tracing::info!("Migrated {count} ordered model(s)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderly_db_backends::SqliteBackend;

    fn settings() -> Settings {
        orderly_core::settings_loader::from_toml_str(
            r#"
            [ordered_models.page]
            db_table = "page"

            [ordered_models.menu_item]
            db_table = "menu_item"
            order_within_fields = ["menu_id"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_selected_models_sorted_by_label() {
        let models = selected_models(None, &settings()).unwrap();
        let tables: Vec<_> = models.iter().map(|m| m.db_table.as_str()).collect();
        assert_eq!(tables, vec!["menu_item", "page"]);

        let one = selected_models(Some(&"page".to_string()), &settings()).unwrap();
        assert_eq!(one.len(), 1);
        assert!(selected_models(Some(&"nope".to_string()), &settings()).is_err());
    }

    #[tokio::test]
    async fn test_ensure_tables_is_idempotent() {
        let backend = SqliteBackend::memory().unwrap();
        let models = selected_models(None, &settings()).unwrap();
        assert_eq!(ensure_tables(&backend, models.clone()).await.unwrap(), 2);
        assert_eq!(ensure_tables(&backend, models).await.unwrap(), 2);

        let rows = backend
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('page', 'menu_item') ORDER BY name",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_command_metadata() {
        assert_eq!(MigrateCommand.name(), "migrate");
        assert!(!MigrateCommand.help().is_empty());
    }
}
