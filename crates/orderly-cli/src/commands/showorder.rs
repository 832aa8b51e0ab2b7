//! The `showorder` management command.
//!
//! Prints the records of one group in order, one `id ordering` pair per
//! line, or as a JSON array with `--json`.

use async_trait::async_trait;
use orderly_core::{OrderlyError, OrderlyResult, Settings};
use orderly_db::{DbExecutor, GroupKey, OrderedGroupRanker, OrderedRecord, OrderingMeta, SqlRecordStore};

use super::{database_arg, group_arg, group_key, model_arg, model_meta, open_database};
use crate::command::ManagementCommand;

/// Prints a group's current order.
pub struct ShoworderCommand;

/// Reads the records of `group` in order.
pub async fn show_order(
    db: &dyn DbExecutor,
    meta: OrderingMeta,
    group: &GroupKey,
) -> OrderlyResult<Vec<OrderedRecord>> {
    OrderedGroupRanker::new(SqlRecordStore::new(db, meta))
        .group(group)
        .await
}

/// Renders records as `id ordering` lines, or as JSON.
pub fn render_order(records: &[OrderedRecord], json: bool) -> OrderlyResult<String> {
    if json {
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|r| serde_json::json!({ "id": r.id, "ordering": r.ordering }))
            .collect();
        return serde_json::to_string_pretty(&rows)
            .map_err(|e| OrderlyError::SerializationError(e.to_string()));
    }

    let mut out = String::new();
    for record in records {
        let id = record.saved_id()?;
        let ordering = record.ordering_value()?;
        out.push_str(&format!("{id} {ordering}\n"));
    }
    Ok(out)
}

#[async_trait]
impl ManagementCommand for ShoworderCommand {
    fn name(&self) -> &'static str {
        "showorder"
    }

    fn help(&self) -> &'static str {
        "Print the records of a group in order"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(model_arg())
            .arg(group_arg())
            .arg(database_arg())
            .arg(
                clap::Arg::new("json")
                    .long("json")
                    .action(clap::ArgAction::SetTrue)
                    .help("Print a JSON array instead of text"),
            )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let meta = model_meta(matches, settings)?;
        // A model without order-within fields has a single, empty group.
        let group = match group_key(matches, &meta)? {
            Some(group) => group,
            None => meta.align_group_key(&GroupKey::empty())?,
        };
        let backend = open_database(matches, settings)?;

        let records = show_order(&backend, meta, &group).await?;
        print!("{}", render_order(&records, matches.get_flag("json"))?);
        tracing::debug!("Listed {} record(s) of group ({group})", records.len());
        Ok(())
    }
}
