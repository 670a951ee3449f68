/// Configuration for tablelink CLI operations
#[derive(Debug, Clone)]
pub struct Config {
    /// Engine settings passed to every session
    pub engine: tablelink::Config,

    /// Records per page served by the fixture driver
    pub page_size: usize,

    /// Always print the stats report, even when the options do not ask
    pub show_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: tablelink::Config::default(),
            page_size: tablelink_driver_memory::DEFAULT_PAGE_SIZE,
            show_stats: false,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration
    pub fn engine(mut self, engine: tablelink::Config) -> Self {
        self.engine = engine;
        self
    }

    /// Set the fixture page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Print the stats report for every run
    pub fn show_stats(mut self, show_stats: bool) -> Self {
        self.show_stats = show_stats;
        self
    }
}
