//! The `move` management command.
//!
//! Moves a record one slot up or down, to an index, or to the end of its
//! group.

use async_trait::async_trait;
use orderly_core::{OrderlyError, OrderlyResult, Settings};
use orderly_db::{
    atomic, DbExecutor, OrderedGroupRanker, OrderedRecord, OrderingMeta, RecordId, RecordStore,
    SqlRecordStore,
};

use super::{database_arg, id_arg, model_arg, model_meta, open_database};
use crate::command::ManagementCommand;

/// Moves a record within its group.
pub struct MoveCommand;

/// Where `move` should put the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// One slot towards the front.
    Up,
    /// One slot towards the back.
    Down,
    /// This index among the other records.
    To(usize),
    /// After every other record.
    Last,
}

impl MoveTarget {
    fn from_matches(matches: &clap::ArgMatches) -> OrderlyResult<Self> {
        if matches.get_flag("up") {
            Ok(Self::Up)
        } else if matches.get_flag("down") {
            Ok(Self::Down)
        } else if matches.get_flag("last") {
            Ok(Self::Last)
        } else {
            matches
                .get_one::<usize>("to")
                .map(|idx| Self::To(*idx))
                .ok_or_else(|| {
                    OrderlyError::Usage("one of --up, --down, --to or --last is required".to_string())
                })
        }
    }
}

/// Moves record `id` to `target`. Returns the record as stored afterwards.
pub async fn move_record(
    db: &dyn DbExecutor,
    meta: OrderingMeta,
    id: RecordId,
    target: MoveTarget,
) -> OrderlyResult<OrderedRecord> {
    atomic(db, |txn| async move {
        let ranker = OrderedGroupRanker::new(SqlRecordStore::new(txn.as_ref(), meta));
        let mut record = ranker.store().get(id).await?;
        match target {
            MoveTarget::Up => ranker.move_up(&mut record).await?,
            MoveTarget::Down => ranker.move_down(&mut record).await?,
            MoveTarget::To(idx) => ranker.move_to(&mut record, Some(idx)).await?,
            MoveTarget::Last => ranker.move_to(&mut record, None).await?,
        }
        Ok(record)
    })
    .await
}

#[async_trait]
impl ManagementCommand for MoveCommand {
    fn name(&self) -> &'static str {
        "move"
    }

    fn help(&self) -> &'static str {
        "Move a record up, down, to an index, or to the end"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        let flag = |name: &'static str, help: &'static str| {
            clap::Arg::new(name)
                .long(name)
                .action(clap::ArgAction::SetTrue)
                .help(help)
        };
        cmd.arg(model_arg())
            .arg(id_arg())
            .arg(flag("up", "Move one slot towards the front"))
            .arg(flag("down", "Move one slot towards the back"))
            .arg(
                clap::Arg::new("to")
                    .long("to")
                    .value_parser(clap::value_parser!(usize))
                    .help("Move to this index among the other records (0 = first)"),
            )
            .arg(flag("last", "Move to the end of the group"))
            .group(
                clap::ArgGroup::new("target")
                    .args(["up", "down", "to", "last"])
                    .required(true),
            )
            .arg(database_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let meta = model_meta(matches, settings)?;
        let id = *matches
            .get_one::<i64>("id")
            .ok_or_else(|| OrderlyError::Usage("--id is required".to_string()))?;
        let target = MoveTarget::from_matches(matches)?;
        let backend = open_database(matches, settings)?;

        let record = move_record(&backend, meta, id, target).await?;
        tracing::info!(
            "Record {id} now has ordering {}",
            record.ordering.unwrap_or_default()
        );
        Ok(())
    }
}
