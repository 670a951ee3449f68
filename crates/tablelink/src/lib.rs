pub mod cache;
pub use cache::RecordCache;

mod config;
pub use config::Config;

pub mod fetcher;
pub use fetcher::Fetcher;

pub mod resolve;
pub use resolve::Resolver;

pub mod session;
pub use session::{Fetched, Session, State};

mod stats;
pub use stats::Stats;

pub use tablelink_core::{
    driver::{self, Driver},
    Error, Field, FieldSpec, Fields, Record, RecordKey, Result, Row, TableOptions, TableRef,
    Value, Warning,
};
