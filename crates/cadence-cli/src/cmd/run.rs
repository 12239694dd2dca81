use crate::context::{runtime, today_or, Context};
use crate::output::{print_json, print_recurrence_runs, print_sweep_runs};
use anyhow::bail;
use cadence_core::automation::{Automation, RunSummary};
use chrono::{NaiveDate, Utc};

/// Every sweep, then every recurrence.
pub fn run(ctx: &Context, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let automation = Automation::new(ctx.tracker()?, config);
    let today = today_or(date);

    let summary = runtime()?.block_on(automation.run(Utc::now(), today));
    report(ctx, &summary, today)
}

pub fn recur(ctx: &Context, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let automation = Automation::new(ctx.tracker()?, config);
    let today = today_or(date);

    let recurrences = runtime()?.block_on(automation.run_recurrences(today));
    let summary = RunSummary {
        recurrences,
        ..RunSummary::default()
    };
    report(ctx, &summary, today)
}

/// Per-item failures are reported and exit zero; a rule that could not run
/// at all (unknown state, team, lookup failure) makes the command fail.
fn report(ctx: &Context, summary: &RunSummary, today: NaiveDate) -> anyhow::Result<()> {
    if ctx.json {
        print_json(summary)?;
    } else {
        if !summary.sweeps.is_empty() {
            print_sweep_runs(&summary.sweeps);
            println!();
        }
        if !summary.recurrences.is_empty() {
            println!("Recurrences for {today}:");
            print_recurrence_runs(&summary.recurrences);
        }
    }

    let aborted = summary.sweeps.iter().filter(|s| s.error.is_some()).count()
        + summary
            .recurrences
            .iter()
            .filter(|r| r.error.is_some())
            .count();
    if aborted > 0 {
        bail!("{aborted} rule(s) could not run");
    }
    Ok(())
}
