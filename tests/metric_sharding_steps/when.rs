//! When steps for metric sharding BDD scenarios.

use super::world::{ShardingWorld, parse_instant, run_async};
use eyre::WrapErr;
use flowstore::tracking::domain::{
    MetricFilter, MetricKind, MetricPoint, MetricRecord, MetricSource, ShardSelector,
};
use rstest_bdd_macros::when;

fn build_record(
    world: &ShardingWorld,
    namespace: &str,
    name: &str,
    key: &str,
    value: &str,
) -> Result<MetricRecord, eyre::Report> {
    let source = MetricSource::new(
        "202401011200000000001",
        "hetero_lr_0",
        "202401011200000000001_hetero_lr_0",
        "guest",
        "9999",
    )
    .wrap_err("construct metric source")?;
    let point = MetricPoint::new(namespace, name, key, MetricKind::Data)
        .wrap_err("construct metric point")?;
    Ok(MetricRecord::new(source, point, value, &*world.clock))
}

#[when(r#"the metric "{namespace}" "{name}" "{key}" is written with value "{value}""#)]
fn write_to_current_shard(
    world: &mut ShardingWorld,
    namespace: String,
    name: String,
    key: String,
    value: String,
) -> Result<(), eyre::Report> {
    let mut record = build_record(world, &namespace, &name, &key, &value)?;
    let result = run_async(
        world
            .store
            .write_metric(&ShardSelector::Current, &mut record),
    );
    world.last_write_result = Some(result);
    if world.first_record.is_none() {
        world.first_record = Some(record);
    }
    Ok(())
}

#[when(r#"the first metric is saved again with value "{value}""#)]
fn resave_first_metric(world: &mut ShardingWorld, value: String) -> Result<(), eyre::Report> {
    let mut record = world
        .first_record
        .take()
        .ok_or_else(|| eyre::eyre!("no metric has been written in this scenario"))?;
    record.set_value(value);
    let result = run_async(
        world
            .store
            .write_metric(&ShardSelector::Current, &mut record),
    );
    world.last_write_result = Some(result);
    world.first_record = Some(record);
    Ok(())
}

#[when(r#"the metric "{namespace}" "{name}" "{key}" is written to shard "{label}""#)]
fn write_to_labelled_shard(
    world: &mut ShardingWorld,
    namespace: String,
    name: String,
    key: String,
    label: String,
) -> Result<(), eyre::Report> {
    let mut record = build_record(world, &namespace, &name, &key, "0.71")?;
    let result = run_async(
        world
            .store
            .write_metric(&ShardSelector::label(label), &mut record),
    );
    world.last_write_result = Some(result);
    Ok(())
}

#[when(r#"the clock advances to "{instant}""#)]
fn advance_clock(world: &mut ShardingWorld, instant: String) -> Result<(), eyre::Report> {
    world.clock.set(parse_instant(&instant)?);
    Ok(())
}

#[when(r#"metrics are queried by namespace "{namespace}""#)]
fn query_by_namespace(world: &mut ShardingWorld, namespace: String) {
    let filter = MetricFilter::new().with_namespace(namespace);
    world.last_query_result = Some(run_async(
        world.store.query_metrics(&ShardSelector::Current, &filter),
    ));
}
