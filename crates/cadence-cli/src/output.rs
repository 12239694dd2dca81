use cadence_core::automation::{RecurrenceRun, SweepRun};
use cadence_core::item::TrackedItem;
use cadence_core::reconcile::ReconcileOutcome;
use cadence_core::sweep::SweepReport;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{cell:w$}")
            })
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    line(sep.iter().map(String::as_str).collect());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}

// ---------------------------------------------------------------------------
// Run reports
// ---------------------------------------------------------------------------

pub fn print_sweep_report(report: &SweepReport) {
    println!(
        "{} -> {}: examined {}, moved {}, failed {}, snoozed {}",
        report.from,
        report.to,
        report.examined,
        report.moved(),
        report.failed(),
        report.skipped_snoozed
    );
    for m in &report.moves {
        match &m.reason {
            None => println!("  UPDATED {}", m.identifier),
            Some(reason) => println!("  FAILED TO UPDATE {} ({reason})", m.identifier),
        }
    }
}

pub fn print_sweep_runs(runs: &[SweepRun]) {
    for run in runs {
        match (&run.report, &run.error) {
            (Some(report), _) => print_sweep_report(report),
            (None, Some(error)) => println!("{} -> {}: not run: {error}", run.from, run.to),
            (None, None) => {}
        }
    }
}

pub fn print_recurrence_runs(runs: &[RecurrenceRun]) {
    let rows: Vec<Vec<String>> = runs
        .iter()
        .map(|r| {
            let (outcome, detail) = match (&r.outcome, &r.error) {
                (Some(outcome), _) => (outcome.label().to_string(), outcome_detail(outcome)),
                (None, Some(error)) => ("error".to_string(), error.clone()),
                (None, None) => ("-".to_string(), String::new()),
            };
            vec![r.title.clone(), r.schedule.clone(), outcome, detail]
        })
        .collect();
    print_table(&["TITLE", "SCHEDULE", "OUTCOME", "DETAIL"], &rows);
}

fn outcome_detail(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::NotScheduled => String::new(),
        ReconcileOutcome::Created { identifier } => identifier.clone().unwrap_or_default(),
        ReconcileOutcome::CreateFailed { reason } => reason.clone(),
        ReconcileOutcome::Reopened { identifier }
        | ReconcileOutcome::SkippedSnoozed { identifier } => identifier.clone(),
        ReconcileOutcome::ReopenFailed { identifier, reason } => format!("{identifier}: {reason}"),
    }
}

pub fn print_items(items: &[TrackedItem]) {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.identifier.clone(),
                item.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                if item.is_snoozed() { "yes" } else { "" }.to_string(),
                item.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "UPDATED", "SNOOZED", "TITLE"], &rows);
}
