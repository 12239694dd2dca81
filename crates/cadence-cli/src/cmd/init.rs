use crate::context::Context;
use anyhow::{bail, Context as _};
use cadence_core::config::Config;

pub fn run(ctx: &Context, team: Option<String>) -> anyhow::Result<()> {
    let path = &ctx.config_path;
    let needs_team = team.is_none();
    let written = Config::starter(team)
        .save_new(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    if !written {
        bail!("{} already exists; edit it or remove it first", path.display());
    }

    println!("created: {}", path.display());
    if needs_team {
        println!("next:    set `defaults.team` to the Linear team for recurring issues");
    }
    println!("then:    cadence config validate");
    Ok(())
}
