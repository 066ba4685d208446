use std::error::Error as StdError;

use thiserror::Error;

/// Everything that can go wrong between typing a city name and getting a report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error("City not found. Please try another.")]
    NotFound,

    /// Timeout, DNS failure, refused connection or a non-2xx status.
    #[error("{0}")]
    Transport(String),

    /// The provider answered, but not with the shape we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let chain = error_chain(&err);
        if err.is_timeout() && !chain.contains("timed out") {
            Self::Transport(format!("request timed out: {chain}"))
        } else {
            Self::Transport(chain)
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// Joins an error and all of its sources, e.g.
/// `error sending request for url (...): operation timed out`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
