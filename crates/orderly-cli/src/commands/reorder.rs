//! The `reorder` management command.
//!
//! Places a record immediately after another record of the same group
//! (`--after ID`) or at the front (`--first`).

use async_trait::async_trait;
use orderly_core::{OrderlyResult, Settings};
use orderly_db::{
    atomic, DbExecutor, OrderedGroupRanker, OrderedRecord, OrderingMeta, RecordId, RecordStore,
    SqlRecordStore,
};

use super::{database_arg, id_arg, model_arg, model_meta, open_database};
use crate::command::ManagementCommand;

/// Moves a record after another one.
pub struct ReorderCommand;

/// Reorders record `id` after `after`, or to the front when `after` is `None`.
///
/// Returns the record as stored afterwards.
pub async fn reorder_record(
    db: &dyn DbExecutor,
    meta: OrderingMeta,
    id: RecordId,
    after: Option<RecordId>,
) -> OrderlyResult<OrderedRecord> {
    atomic(db, |txn| async move {
        let ranker = OrderedGroupRanker::new(SqlRecordStore::new(txn.as_ref(), meta));
        let mut record = ranker.store().get(id).await?;
        match after {
            Some(after_id) => {
                let mut anchor = ranker.store().get(after_id).await?;
                ranker.reorder(&mut record, Some(&mut anchor)).await?;
            }
            None => ranker.reorder(&mut record, None).await?,
        }
        Ok(record)
    })
    .await
}

#[async_trait]
impl ManagementCommand for ReorderCommand {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn help(&self) -> &'static str {
        "Place a record right after another record of its group"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(model_arg())
            .arg(id_arg())
            .arg(
                clap::Arg::new("after")
                    .long("after")
                    .value_parser(clap::value_parser!(i64))
                    .help("Id of the record to follow"),
            )
            .arg(
                clap::Arg::new("first")
                    .long("first")
                    .action(clap::ArgAction::SetTrue)
                    .help("Move to the front of the group"),
            )
            .group(
                clap::ArgGroup::new("position")
                    .args(["after", "first"])
                    .required(true),
            )
            .arg(database_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let meta = model_meta(matches, settings)?;
        let id = *matches
            .get_one::<i64>("id")
            .ok_or_else(|| orderly_core::OrderlyError::Usage("--id is required".to_string()))?;
        let after = matches.get_one::<i64>("after").copied();
        let backend = open_database(matches, settings)?;

        let record = reorder_record(&backend, meta, id, after).await?;
        tracing::info!(
            "Record {id} now has ordering {}",
            record.ordering.unwrap_or_default()
        );
        Ok(())
    }
}
