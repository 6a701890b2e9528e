//! Given steps for metric sharding BDD scenarios.

use super::world::{ShardingWorld, parse_instant};
use rstest_bdd_macros::given;

#[given(r#"a metric store whose clock reads "{instant}""#)]
fn store_with_clock(world: &mut ShardingWorld, instant: String) -> Result<(), eyre::Report> {
    world.clock.set(parse_instant(&instant)?);
    Ok(())
}
