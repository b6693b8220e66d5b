use thiserror::Error;

/// Describes the various errors that can be returned from the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Indicates that the given URL is invalid, contains the underlying parsing error
    #[error("Invalid URL given: {0:?}")]
    InvalidURL(#[from] url::ParseError),
    /// Invalid configuration was given to the client
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// There was a problem with the http client. This is likely not a user issue. Contains the
    /// underlying error
    #[error("Error creating request: {0:?}")]
    HttpClientError(#[from] reqwest::Error),
    /// A request body could not be serialized or a response body could not be deserialized
    #[error("Invalid JSON: {0:?}")]
    Serialization(#[from] serde_json::Error),
    /// An invalid ID was given. Returns the underlying parse error
    #[error("Invalid id: {0:?}")]
    InvalidId(#[from] crate::id::ParseError),
    /// The given name or ID prefix does not belong to any registered resource type
    #[error("Unknown resource type: {0:?}")]
    UnknownResource(String),
    /// The operation needs the object's ID, but the object has not been created yet
    #[error("Object has no ID. It must be created before it can be saved")]
    MissingId,

    // API errors
    /// The requested object was not found
    #[error("Resource was not found")]
    ResourceNotFound,
    /// Invalid credentials were used or the API key does not have access to the requested
    /// resource
    #[error("API key is invalid or is not authorized to access the requested resource")]
    Unauthorized,
    /// The API is rate limiting this client
    #[error("Too many requests, the API is rate limiting this client")]
    RateLimited,
    /// The error returned when the request is invalid. Contains the underlying HTTP status code and
    /// any message returned from the API
    #[error("Invalid request (status code {status_code:?}): {message:?}")]
    InvalidRequest {
        status_code: reqwest::StatusCode,
        message: Option<String>,
    },
    /// A server error was encountered. Contains an optional message from the server
    #[error("Server has encountered an error: {0:?}")]
    ServerError(Option<String>),

    /// The operation is part of the generic resource interface but the API does not offer it for
    /// this resource type. This is permanent and is never retried
    #[error("{resource}.{operation} not implemented: the API does not support this operation for {resource} resources")]
    UnsupportedOperation {
        resource: &'static str,
        operation: &'static str,
    },

    /// A catch-all for uncategorized errors. Contains an error message describing the underlying
    /// issue
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Whether the failure is transient, meaning the same request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::RateLimited | ClientError::ServerError(_) => true,
            ClientError::HttpClientError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<std::convert::Infallible> for ClientError {
    fn from(_: std::convert::Infallible) -> Self {
        // Doesn't matter what we return as Infallible cannot happen
        ClientError::Other("Shouldn't happen".to_string())
    }
}
