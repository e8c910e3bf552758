//! Configuration scaffolding command.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tapsynth_config::EngineConfig;

#[derive(Args)]
pub struct InitConfigArgs {
    /// Destination TOML file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }

    EngineConfig::default()
        .save(&args.path)
        .with_context(|| format!("writing {}", args.path.display()))?;

    println!("Wrote default configuration to {}", args.path.display());
    Ok(())
}
