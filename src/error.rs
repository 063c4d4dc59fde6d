//! Errors of a fetch-and-render cycle.
//!
//! Every variant is fatal to the current cycle only. The soft end of pagination is not an error and
//! never shows up here.

use thiserror::Error;

/// The error type of this crate.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("request to {url} failed (status {status}): {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The page body is not JSON, or a list in it does not match the record type.
    #[error("failed to decode {what} from {url}: {source}")]
    Decode {
        what: String,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The page body lacks the expected list field.
    #[error("missing field `{field}` in page {url}")]
    MissingField { field: String, url: String },

    /// A timestamp column could not be coerced.
    #[error("invalid timestamp in `{field}` of record {id}: {value:?}")]
    Timestamp {
        field: &'static str,
        id: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A repository name that is not of the form `owner/name`.
    #[error("invalid repository {0:?}, expected `owner/name`")]
    InvalidRepository(String),

    /// A run limit outside the selectable options.
    #[error("invalid run limit {0}, expected one of 100, 200, 300, 500, 1000, 2000")]
    InvalidRunLimit(u32),
}

/// A shorthand for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
