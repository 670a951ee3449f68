pub mod driver;
pub use driver::Driver;

mod error;
pub use error::{Error, IntoError};

pub mod options;
pub use options::{FieldSpec, Fields, TableOptions, TableRef};

pub mod record;
pub use record::{Record, RecordKey};

pub mod row;
pub use row::{Field, Row};

pub mod value;
pub use value::Value;

mod warning;
pub use warning::Warning;

/// A Result type alias that uses tablelink's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
