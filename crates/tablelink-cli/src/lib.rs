mod config;
mod generate;

pub use config::*;
pub use generate::*;

use anyhow::Result;
use clap::Parser;

/// tablelink CLI library for building custom command-line tools
pub struct TablelinkCli {
    config: Config,
}

impl TablelinkCli {
    /// Create a new TablelinkCli instance with the default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create a new TablelinkCli instance with a custom configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse and execute CLI commands from command-line arguments
    pub async fn parse_and_run(&self) -> Result<()> {
        let cli = Cli::parse();
        self.run(cli).await
    }

    /// Parse and execute CLI commands from an iterator of arguments
    pub async fn parse_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::parse_from(args);
        self.run(cli).await
    }

    async fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Generate(cmd) => cmd.run(&self.config).await,
        }
    }
}

impl Default for TablelinkCli {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Parser, Debug)]
#[command(name = "tablelink")]
#[command(about = "tablelink CLI - Fetch linked tables into generated modules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Fetch a table and emit it as a JavaScript module
    Generate(GenerateCommand),
}
