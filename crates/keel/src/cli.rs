use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keel_core::config::Configuration;
use keel_core::kernel::error::Result;

/// Keel: an extensible HTTP application kernel
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Flat JSON, TOML or YAML file merged under the process environment
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Bootstrap and serve HTTP on PORT (default)
    Serve,
    /// Bootstrap, report and exit
    Check,
    /// Bootstrap and list every mounted route
    Routes,
    /// Bootstrap and fire the migrate event
    Migrate,
}

impl CliArgs {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }

    /// Configuration file values, overridden by the environment.
    pub fn configuration(&self) -> Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::from_file(path)?,
            None => Configuration::new(),
        };
        config.merge(Configuration::from_env());
        Ok(config)
    }
}
