use crate::context::Context;
use crate::output::print_json;
use anyhow::Context as _;
use cadence_core::config::{Config, WarnLevel};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Print the resolved config file path
    Path,
}

pub fn run(ctx: &Context, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(ctx),
        ConfigSubcommand::Path => {
            if ctx.json {
                print_json(&serde_json::json!({
                    "path": ctx.config_path,
                    "exists": ctx.config_path.exists(),
                }))
            } else {
                println!("{}", ctx.config_path.display());
                Ok(())
            }
        }
    }
}

fn validate(ctx: &Context) -> anyhow::Result<()> {
    let config = Config::load(&ctx.config_path).context("failed to load config")?;
    let warnings = config.validate();

    if ctx.json {
        print_json(&serde_json::json!({
            "path": ctx.config_path,
            "sweeps": config.sweeps.len(),
            "recurrences": config.recurrences.len(),
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!(
            "Config is valid: {} sweep(s), {} recurrence(s). No warnings.",
            config.sweeps.len(),
            config.recurrences.len()
        );
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
