use thiserror::Error;

/// Every failure the pipeline can report back to the caller.
///
/// `Display` is the bare message; the invocation adapter serialises it as
/// `{"error": <message>}`.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Bad transport encoding, missing fields or invalid JSON.
    #[error("{0}")]
    MalformedEvent(String),

    /// The payload decoded fine but is not a webhook kind we handle.
    #[error("{0}")]
    UnsupportedEvent(String),

    /// A required setting is absent or unusable.
    #[error("{0}")]
    Configuration(String),

    /// The log sink could not be reached or rejected the record.
    #[error("{0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, WebhookError>;
