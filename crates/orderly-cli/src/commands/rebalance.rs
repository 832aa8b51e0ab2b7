//! The `rebalance` management command.
//!
//! Rewrites ordering keys to `gap, 2*gap, ...` for one group (`--group`) or
//! for every group of a model. Relative order is preserved.

use async_trait::async_trait;
use orderly_core::{OrderlyResult, Settings};
use orderly_db::{atomic, DbExecutor, GroupKey, OrderedGroupRanker, OrderingMeta, SqlRecordStore};

use super::{database_arg, group_arg, group_key, model_arg, model_meta, open_database};
use crate::command::ManagementCommand;

/// Rebalances the ordering keys of a model.
pub struct RebalanceCommand;

/// Rebalances one group. Returns the number of records rewritten.
pub async fn rebalance_group(
    db: &dyn DbExecutor,
    meta: OrderingMeta,
    group: &GroupKey,
) -> OrderlyResult<usize> {
    atomic(db, |txn| async move {
        let ranker = OrderedGroupRanker::new(SqlRecordStore::new(txn.as_ref(), meta));
        let rewritten = ranker.rebalance(group, &mut []).await?;
        Ok(rewritten)
    })
    .await
}

/// Rebalances every group. Returns the number of groups.
pub async fn rebalance_all(db: &dyn DbExecutor, meta: OrderingMeta) -> OrderlyResult<usize> {
    atomic(db, |txn| async move {
        let ranker = OrderedGroupRanker::new(SqlRecordStore::new(txn.as_ref(), meta));
        let groups = ranker.rebalance_all_groups().await?;
        Ok(groups)
    })
    .await
}

#[async_trait]
impl ManagementCommand for RebalanceCommand {
    fn name(&self) -> &'static str {
        "rebalance"
    }

    fn help(&self) -> &'static str {
        "Respace ordering keys of one group, or of every group"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(model_arg()).arg(group_arg()).arg(database_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> OrderlyResult<()> {
        let meta = model_meta(matches, settings)?;
        let group = group_key(matches, &meta)?;
        let table = meta.db_table.clone();
        let backend = open_database(matches, settings)?;

        match group {
            Some(group) => {
                let rewritten = rebalance_group(&backend, meta, &group).await?;
                tracing::info!("Rebalanced '{table}' group ({group}): {rewritten} record(s) rewritten");
            }
            None => {
                let groups = rebalance_all(&backend, meta).await?;
                tracing::info!("Rebalanced {groups} group(s) of '{table}'");
            }
        }
        Ok(())
    }
}
