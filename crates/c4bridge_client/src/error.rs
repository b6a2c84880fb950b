use thiserror::Error;

/// Errors returned by [`VariableClient`](crate::VariableClient).
///
/// The first three variants are the runtime failure modes of a round trip.
/// None of them is retried by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Timeout, refused or reset connection, or a failure reading the body.
    #[error("Request to web driver failed: {source}")]
    TransientIo {
        #[source]
        source: reqwest::Error,
    },

    /// The web driver answered with something other than HTTP 200.
    #[error("Web driver rejected request (HTTP {status})")]
    RemoteRejected { status: u16 },

    /// The body of a `get` response was not the expected flat JSON object.
    #[error("Malformed response from web driver: {message}")]
    MalformedResponse { message: String, body: String },

    /// `get` was called without any variable IDs.
    #[error("No variable IDs requested")]
    EmptyRequest,

    /// The endpoint parameters are unusable.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The base URL does not parse.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl Error {
    pub(crate) fn transient(source: reqwest::Error) -> Self {
        Self::TransientIo { source }
    }

    /// Returns `true` for failures where the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }

    /// Returns `true` if the request ran past the endpoint timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::TransientIo { source } => source.is_timeout(),
            _ => false,
        }
    }

    /// The HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status } => Some(*status),
            _ => None,
        }
    }
}
