//! Error types shared by the scraping, calendar and publishing stages.

use reqwest::StatusCode;

/// A page or feed could not be retrieved. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("GET {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A calendar summary that is not of the form `title, venue (SpNr. n)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized event summary {summary:?}")]
pub struct ParseMismatch {
    pub summary: String,
}

/// The calendar document itself is malformed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("END:{found} does not close BEGIN:{expected}")]
    Unbalanced { expected: String, found: String },
    #[error("END:{0} without matching BEGIN")]
    UnexpectedEnd(String),
    #[error("calendar component {0} is never closed")]
    Unterminated(String),
    #[error("invalid {property} value {value:?}")]
    Timestamp {
        property: &'static str,
        value: String,
        #[source]
        source: jiff::Error,
    },
}

/// A call to the event API failed. Remaining writes for the league are abandoned.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: String,
        status: StatusCode,
        body: String,
    },
    #[error("{operation} failed")]
    Request {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: bad endpoint url")]
    Url {
        operation: String,
        #[source]
        source: url::ParseError,
    },
}
