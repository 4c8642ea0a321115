/// Errors surfaced by backend calls.
///
/// Neither variant is fatal to a node: connectivity failures are retried on
/// the next scheduled interval, and protocol failures are treated as "no new
/// information" with no transition taken.
#[derive(Debug)]
pub enum BackendError {
    /// The backend could not be reached within the call timeout.
    Connectivity(String),
    /// The backend answered with a malformed or unexpected payload.
    Protocol(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            BackendError::Connectivity(err.to_string())
        } else {
            BackendError::Protocol(err.to_string())
        }
    }
}
