use crate::context::{today_or, Context};
use crate::output::{print_json, print_table};
use anyhow::anyhow;
use cadence_core::Schedule;
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum ScheduleSubcommand {
    /// List every named schedule and whether it fires on the date
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Only show schedules that fire
        #[arg(long)]
        firing: bool,
    },

    /// Check one schedule against a date
    Check {
        /// Schedule name, e.g. every_monday or first_friday_of_the_month
        name: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct ScheduleCheck {
    name: String,
    date: NaiveDate,
    fires: bool,
}

impl ScheduleCheck {
    fn new(schedule: Schedule, date: NaiveDate) -> Self {
        Self {
            name: schedule.name(),
            date,
            fires: schedule.fires_on(date),
        }
    }
}

pub fn run(ctx: &Context, subcmd: ScheduleSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ScheduleSubcommand::List { date, firing } => list(ctx, today_or(date), firing),
        ScheduleSubcommand::Check { name, date } => check(ctx, &name, today_or(date)),
    }
}

fn list(ctx: &Context, date: NaiveDate, firing: bool) -> anyhow::Result<()> {
    let checks: Vec<ScheduleCheck> = Schedule::all_named()
        .into_iter()
        .map(|s| ScheduleCheck::new(s, date))
        .filter(|c| !firing || c.fires)
        .collect();

    if ctx.json {
        return print_json(&checks);
    }

    println!("Schedules on {date} ({}):", date.format("%A"));
    let rows: Vec<Vec<String>> = checks
        .iter()
        .map(|c| vec![c.name.clone(), if c.fires { "yes" } else { "no" }.to_string()])
        .collect();
    print_table(&["SCHEDULE", "FIRES"], &rows);
    Ok(())
}

fn check(ctx: &Context, name: &str, date: NaiveDate) -> anyhow::Result<()> {
    let schedule: Schedule = name.parse().map_err(|e| anyhow!("{e}"))?;
    let result = ScheduleCheck::new(schedule, date);

    if ctx.json {
        return print_json(&result);
    }
    let verdict = if result.fires { "fires" } else { "does not fire" };
    println!("{} {verdict} on {date}", result.name);
    Ok(())
}
