//! Then steps for metric sharding BDD scenarios.

use super::world::ShardingWorld;
use flowstore::tracking::{domain::ShardKey, services::MetricStoreError};
use rstest_bdd_macros::then;

fn table_names(world: &ShardingWorld) -> Result<Vec<String>, eyre::Report> {
    let tables = world
        .storage
        .table_names()
        .map_err(|err| eyre::eyre!("list tables: {err}"))?;
    Ok(tables
        .iter()
        .map(|table| table.as_str().to_owned())
        .collect())
}

#[then("{count:usize} metrics are returned")]
fn metrics_returned(world: &ShardingWorld, count: usize) -> Result<(), eyre::Report> {
    let records = world
        .last_query_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing query result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected query failure: {err}"))?;
    if records.len() != count {
        return Err(eyre::eyre!(
            "expected {count} metrics, found {}",
            records.len()
        ));
    }
    Ok(())
}

#[then(r#"the shard tables are "{tables}""#)]
fn shard_tables_are(world: &ShardingWorld, tables: String) -> Result<(), eyre::Report> {
    let expected: Vec<String> = tables.split(',').map(str::to_owned).collect();
    let actual = table_names(world)?;
    if actual != expected {
        return Err(eyre::eyre!("expected tables {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"shard "{label}" is cached"#)]
fn shard_is_cached(world: &ShardingWorld, label: String) -> Result<(), eyre::Report> {
    let key = ShardKey::from_label(&label).map_err(|err| eyre::eyre!("{err}"))?;
    if !world.store.cached_shards().contains(&key) {
        return Err(eyre::eyre!("shard {label} is not cached"));
    }
    Ok(())
}

#[then("the write is rejected as an invalid shard")]
fn write_rejected(world: &ShardingWorld) -> Result<(), eyre::Report> {
    match world.last_write_result.as_ref() {
        Some(Err(MetricStoreError::Domain(_))) => Ok(()),
        Some(other) => Err(eyre::eyre!("expected a domain error, found {other:?}")),
        None => Err(eyre::eyre!("missing write result in scenario world")),
    }
}

#[then(r#"the write is rejected as belonging to shard "{label}""#)]
fn write_rejected_for_bound_shard(world: &ShardingWorld, label: String) -> Result<(), eyre::Report> {
    match world.last_write_result.as_ref() {
        Some(Err(MetricStoreError::ShardMismatch { bound, .. })) if bound.as_str() == label => {
            Ok(())
        }
        Some(other) => Err(eyre::eyre!(
            "expected a mismatch against shard {label}, found {other:?}"
        )),
        None => Err(eyre::eyre!("missing write result in scenario world")),
    }
}

#[then("no shard tables exist")]
fn no_shard_tables(world: &ShardingWorld) -> Result<(), eyre::Report> {
    let actual = table_names(world)?;
    if !actual.is_empty() {
        return Err(eyre::eyre!("expected no tables, found {actual:?}"));
    }
    if !world.store.cached_shards().is_empty() {
        return Err(eyre::eyre!("expected an empty shard cache"));
    }
    Ok(())
}
