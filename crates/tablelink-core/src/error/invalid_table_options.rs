use super::Error;

/// Error when table options cannot be used to query a table.
///
/// This occurs when:
/// - The options are not a JSON object
/// - A table reference is missing its `baseId` or `tableName`
/// - A nested `resolve` or `cacheTables` entry has the wrong shape
///
/// A malformed `fields` list is not an error; it is recovered per record
/// with a warning.
#[derive(Debug)]
pub(super) struct InvalidTableOptions {
    message: Box<str>,
}

impl std::error::Error for InvalidTableOptions {}

impl core::fmt::Display for InvalidTableOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid table options: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid table options error.
    pub fn invalid_table_options(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidTableOptions(InvalidTableOptions {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid table options error.
    pub fn is_invalid_table_options(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::InvalidTableOptions(_)))
    }
}
