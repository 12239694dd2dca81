use crate::context::{runtime, Context};
use crate::output::{print_items, print_json};
use cadence_core::catalog::Catalog;
use cadence_core::sweep::find_stale;
use cadence_core::Duration;
use chrono::Utc;

pub fn run(ctx: &Context, after: Duration, state: Option<&str>) -> anyhow::Result<()> {
    let catalog = Catalog::new(ctx.tracker()?);
    let items = runtime()?.block_on(find_stale(&catalog, state, after, Utc::now()))?;

    if ctx.json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("Nothing older than {after}.");
        return Ok(());
    }
    print_items(&items);
    Ok(())
}
