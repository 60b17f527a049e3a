/// Failure of a single round trip to the task service.
///
/// `Clone` so that the store can keep the last fetch failure in its
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The service could not be reached, timed out, or dropped the
    /// connection mid-response.
    #[error("cannot reach task service: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("task service rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Success status, but the body was not the expected shape.
    #[error("unexpected response from task service: {0}")]
    InvalidResponse(String),

    /// The client itself could not be set up.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for a toast or an error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Cannot connect to the task service. Please make sure the backend is running."
                    .to_string()
            }
            ClientError::Remote { message, .. } => {
                format!("The request was rejected: {message}")
            }
            ClientError::InvalidResponse(_) => {
                "The task service sent a response that could not be read.".to_string()
            }
            ClientError::Config(detail) => format!("The task client is misconfigured: {detail}"),
        }
    }
}
