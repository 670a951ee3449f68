/// Request counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Remote calls issued. A paginated select counts once.
    pub requests: u64,

    /// Record lookups served from the cache
    pub cache_hits: u64,
}

impl core::fmt::Display for Stats {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} requests, {} cache hits",
            self.requests, self.cache_hits
        )
    }
}
