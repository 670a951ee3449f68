use crate::{Config, Fetcher, RecordCache, Resolver, Stats};

use std::sync::Arc;
use tablelink_core::{Driver, Error, Result, Row, TableOptions, Warning};

/// One fetch of a table, from pre-caching to filtered rows.
///
/// A session owns its record cache, so counters and cached records never
/// leak between sessions. Each session runs once.
#[derive(Debug)]
pub struct Session {
    driver: Arc<dyn Driver>,
    config: Config,
    cache: RecordCache,
    state: State,
}

/// Where a session is in its run. States only move forward; `Done` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    PreCaching,
    PrimaryFetching,
    Resolving,
    Filtering,
    Done,
    Failed,
}

/// The result of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub rows: Vec<Row>,
    pub stats: Stats,

    /// Non-fatal problems found while resolving
    pub warnings: Vec<Warning>,
}

impl Session {
    pub fn new(driver: impl Driver) -> Self {
        Self::with_config(driver, Config::default())
    }

    pub fn with_config(driver: impl Driver, config: Config) -> Self {
        Self::from_shared(Arc::new(driver), config)
    }

    /// Create a session over a driver shared with other sessions.
    pub fn from_shared(driver: Arc<dyn Driver>, config: Config) -> Self {
        Self {
            driver,
            config,
            cache: RecordCache::new(),
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn stats(&self) -> Stats {
        self.cache.stats()
    }

    /// Fetches and resolves the table described by `options`.
    ///
    /// Cache tables are read in full first; a failure there, in the primary
    /// select, or in a reference lookup fails the session. Rows are then
    /// filtered on `include_filter` when it is set.
    pub async fn fetch(&mut self, options: &TableOptions) -> Result<Fetched> {
        if self.state != State::Idle {
            return Err(Error::invalid_session_state(format!(
                "fetch called on a session in state {:?}; create a new session per fetch",
                self.state
            )));
        }

        let res = self.run(options).await;

        if let Err(err) = &res {
            tracing::error!(table = %options.table, state = ?self.state, %err, "session failed");
            self.state = State::Failed;
        }

        res
    }

    async fn run(&mut self, options: &TableOptions) -> Result<Fetched> {
        options.validate()?;

        let fetcher = Fetcher::new(&*self.driver, &self.cache);

        self.state = State::PreCaching;
        for table in &options.cache_tables {
            let records = fetcher
                .select_all(table, true)
                .await
                .map_err(|err| err.context(format!("pre-caching {table}")))?;
            tracing::info!(%table, num_records = records.len(), "pre-cached table");
        }

        self.state = State::PrimaryFetching;
        let records = fetcher.select_all(&options.table, false).await?;

        self.state = State::Resolving;
        let resolver = Resolver::new(fetcher, &self.config);
        let mut rows = resolver.resolve_all(&records, options).await?;
        let warnings = resolver.take_warnings();

        self.state = State::Filtering;
        if let Some(name) = &options.include_filter {
            let before = rows.len();
            rows.retain(|row| row.is_truthy(name));
            tracing::debug!(filter = %name, before, after = rows.len(), "filtered rows");
        }

        self.state = State::Done;

        let stats = self.cache.stats();
        tracing::info!(
            table = %options.table,
            num_rows = rows.len(),
            requests = stats.requests,
            cache_hits = stats.cache_hits,
            num_warnings = warnings.len(),
            "fetched table"
        );

        Ok(Fetched {
            rows,
            stats,
            warnings,
        })
    }
}
