//! Lichen - a markdown CMS that serves a content tree on demand or
//! pre-renders it into a dist mirror.

mod build;
mod cli;
mod config;
mod dist;
mod error;
mod logger;
mod markdown;
mod render;
mod router;
mod serve;

use anyhow::Result;
use build::{build_site, success_message};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Build { .. } => {
            build_site(config)?;
            println!("{}", success_message(config));
            Ok(())
        }
        Commands::Serve { .. } => serve_site(config),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is fine: the defaults describe a bare content
/// tree with `dist/` and `theme/` next to it.
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}
