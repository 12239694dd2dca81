use crate::context::{runtime, Context};
use crate::output::{print_json, print_sweep_report};
use anyhow::Context as _;
use cadence_core::catalog::Catalog;
use cadence_core::sweep::{StaleSweeper, SweepRule};
use cadence_core::Duration;
use chrono::Utc;

/// One ad-hoc sweep. Does not need a config file.
pub fn run(
    ctx: &Context,
    from: String,
    to: String,
    after: Duration,
    max_concurrency: usize,
) -> anyhow::Result<()> {
    let catalog = Catalog::new(ctx.tracker()?);
    let rule = SweepRule::new(from, to, after);

    let report = runtime()?
        .block_on(async {
            StaleSweeper::new(&catalog)
                .with_max_concurrency(max_concurrency)
                .sweep(&rule, Utc::now())
                .await
        })
        .with_context(|| format!("sweep {} -> {} failed", rule.from, rule.to))?;

    if ctx.json {
        print_json(&report)
    } else {
        print_sweep_report(&report);
        Ok(())
    }
}
