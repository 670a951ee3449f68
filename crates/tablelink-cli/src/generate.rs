use crate::Config;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fmt::Write as _, path::PathBuf};
use tablelink::{Fetched, Row, Session, TableOptions};
use tablelink_driver_memory::Memory;

#[derive(Parser, Debug)]
pub struct GenerateCommand {
    /// Table options source file (JSON)
    pub options: PathBuf,

    /// Base fixture the tables are read from (JSON)
    #[arg(long)]
    pub data: PathBuf,

    /// Write the module to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print request and cache-hit counts to stderr
    #[arg(long)]
    pub show_stats: bool,

    /// Records per page served by the fixture
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Number of top-level records resolved at the same time
    #[arg(long)]
    pub record_concurrency: Option<usize>,

    /// Deepest level of nested rows to resolve
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl GenerateCommand {
    pub async fn run(self, config: &Config) -> Result<()> {
        let source = std::fs::read_to_string(&self.options)
            .with_context(|| format!("failed to read {}", self.options.display()))?;
        let options = TableOptions::from_json_str(&source)
            .with_context(|| format!("failed to parse {}", self.options.display()))?;

        let data = std::fs::read_to_string(&self.data)
            .with_context(|| format!("failed to read {}", self.data.display()))?;
        let data: serde_json::Value = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", self.data.display()))?;
        let driver = Memory::from_json(data)
            .with_context(|| format!("failed to load {}", self.data.display()))?
            .page_size(self.page_size.unwrap_or(config.page_size));

        let mut engine = config.engine.clone();
        if let Some(record_concurrency) = self.record_concurrency {
            engine = engine.record_concurrency(record_concurrency);
        }
        if let Some(max_depth) = self.max_depth {
            engine = engine.max_depth(max_depth);
        }

        let mut session = Session::with_config(driver, engine);
        let fetched = session
            .fetch(&options)
            .await
            .with_context(|| format!("failed to fetch {}", options.table))?;

        let module = render_module(&fetched.rows)?;

        match &self.out {
            Some(path) => {
                std::fs::write(path, module)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(rows = fetched.rows.len(), path = %path.display(), "wrote module");
            }
            None => print!("{module}"),
        }

        if self.show_stats || config.show_stats || options.show_stats {
            eprint!("{}", stats_report(&options, &fetched));
        }

        Ok(())
    }
}

/// Renders rows as an ES module whose default export is the row array.
pub fn render_module(rows: &[Row]) -> Result<String> {
    Ok(format!("export default {};\n", serde_json::to_string(rows)?))
}

/// Human-readable summary of a fetch.
pub fn stats_report(options: &TableOptions, fetched: &Fetched) -> String {
    let mut report = String::new();

    let _ = writeln!(report, "Table: {}", options.table);
    let _ = writeln!(report, "Rows: {}", fetched.rows.len());
    let _ = writeln!(report, "Requests: {}", fetched.stats.requests);
    let _ = writeln!(report, "Cache hits: {}", fetched.stats.cache_hits);

    if !fetched.warnings.is_empty() {
        let _ = writeln!(report, "Warnings:");
        for warning in &fetched.warnings {
            let _ = writeln!(report, "  - {warning}");
        }
    }

    report
}
