//! `node-collector platforms` - List platforms with bundled specs.

use anyhow::Result;
use colored::Colorize;
use nodecollect::EmbeddedAssets;

use super::Context;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context) -> Result<()> {
    let platforms: Vec<&str> = EmbeddedAssets::platforms().collect();

    match ctx.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&platforms)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&platforms)?),
        OutputFormat::Table => {
            println!("{}", "Bundled platforms:".bold());
            for platform in platforms {
                println!("  {} {}", "-".cyan(), platform);
            }
        }
    }
    Ok(())
}
