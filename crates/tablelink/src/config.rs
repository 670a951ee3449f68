/// Engine settings for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of top-level records resolved at the same time. References
    /// inside one field are always resolved one id at a time.
    pub record_concurrency: usize,

    /// Deepest level of nested rows that will be resolved. Top-level rows
    /// are level 0; `0` disables reference resolution.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_concurrency: 8,
            max_depth: 32,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record concurrency. Values below one are treated as one.
    pub fn record_concurrency(mut self, record_concurrency: usize) -> Self {
        self.record_concurrency = record_concurrency.max(1);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
