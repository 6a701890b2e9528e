//! Behaviour tests for routing metrics to date-partitioned shards.

mod metric_sharding_steps;

use metric_sharding_steps::world::{ShardingWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/metric_sharding.feature",
    name = "Metrics written on one day share that day's shard"
)]
#[tokio::test(flavor = "multi_thread")]
async fn same_day_writes_share_a_shard(world: ShardingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/metric_sharding.feature",
    name = "Writes on either side of midnight land in separate shards"
)]
#[tokio::test(flavor = "multi_thread")]
async fn midnight_splits_shards(world: ShardingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/metric_sharding.feature",
    name = "A record saved before midnight is not rewritten into the next day"
)]
#[tokio::test(flavor = "multi_thread")]
async fn saved_record_stays_in_its_shard(world: ShardingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/metric_sharding.feature",
    name = "An explicit label overrides the current date"
)]
#[tokio::test(flavor = "multi_thread")]
async fn label_overrides_date(world: ShardingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/metric_sharding.feature",
    name = "A malformed label is rejected before any table exists"
)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_label_is_rejected(world: ShardingWorld) {
    let _ = world;
}
