//! Failures of the CouchDB backend, converted into `StorageError` at the trait boundary.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures raised while talking to CouchDB's HTTP document API.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build the CouchDB HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The database probe at start-up or reconnect could not be sent.
    #[error("failed to reach CouchDB database `{database}`")]
    DatabaseQuery {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} for database `{database}`")]
    DatabaseStatus {
        database: String,
        status: StatusCode,
    },
    /// A user or game document request could not be sent.
    #[error("failed to send CouchDB request for `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Anything but 2xx, or 404 where a missing document is acceptable.
    #[error("CouchDB answered {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    #[error("failed to decode CouchDB response body for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// An `_all_docs` row did not match the user or game document layout.
    #[error("malformed CouchDB document listed by `{path}`")]
    DeserializeValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// Document id is not `user::<uuid>` or `game::<uuid>`.
    #[error("invalid document id `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}
