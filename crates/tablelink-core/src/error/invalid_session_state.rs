use super::Error;

/// Error when a session is driven outside of its state machine, such as
/// fetching twice with the same session.
#[derive(Debug)]
pub(super) struct InvalidSessionState {
    message: Box<str>,
}

impl std::error::Error for InvalidSessionState {}

impl core::fmt::Display for InvalidSessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid session state: {}", self.message)
    }
}

impl Error {
    pub fn invalid_session_state(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSessionState(InvalidSessionState {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_session_state(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::InvalidSessionState(_)))
    }
}
