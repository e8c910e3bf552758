//! Parameter listing command.

use clap::Args;
use std::path::PathBuf;
use tapsynth_synth::{ParamInfo, SharedParams};

#[derive(Args)]
pub struct ParamsArgs {
    /// Engine configuration (TOML) supplying current values
    #[arg(long)]
    config: Option<PathBuf>,
}

fn format_value(info: &ParamInfo, value: f32) -> String {
    if info.is_choice() {
        let index = value.round().max(0.0) as usize;
        info.choices
            .get(index)
            .map_or_else(|| format!("{index}"), |name| format!("{index} ({name})"))
    } else if info.unit.is_empty() {
        format!("{value}")
    } else {
        format!("{value} {}", info.unit)
    }
}

fn format_range(info: &ParamInfo) -> String {
    if info.is_choice() {
        info.choices.join(" | ")
    } else {
        format!("{} .. {}", info.min, info.max)
    }
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let params = SharedParams::from_voice_params(&config.voice);

    println!(
        "{:<16} {:<40} {:<18} {}",
        "NAME", "RANGE", "DEFAULT", "CURRENT"
    );
    for info in params.infos() {
        println!(
            "{:<16} {:<40} {:<18} {}",
            info.name,
            format_range(info),
            format_value(info, info.default),
            format_value(info, params.get_id(info.id)),
        );
    }
    Ok(())
}
