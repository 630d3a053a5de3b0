pub use anyhow::{anyhow, bail, ensure, Context, Error, Result};

/// Well-known error classes raised by connectors.
///
/// These are carried inside `anyhow::Error` so callers can branch on the
/// class via `downcast_ref` while the message flows through `Display`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    /// The supplied connection configuration cannot be used, eg a required
    /// field is missing or the driver path contains no usable artifacts.
    /// Raised before any driver activity takes place.
    #[error("invalid connector configuration: {0}")]
    ConfigInvalid(String),
    /// The dial to the remote database failed, either reported by the
    /// underlying driver or due to an unexpected failure during the attempt.
    #[error("failed to connect to data source: {0}")]
    ConnectionFailed(String),
}

impl ConnectorError {
    /// Whether the supplied error is a configuration error
    pub fn is_config(err: &Error) -> bool {
        matches!(
            err.downcast_ref::<ConnectorError>(),
            Some(Self::ConfigInvalid(_))
        )
    }

    /// Whether the supplied error is a connection failure
    pub fn is_connection(err: &Error) -> bool {
        matches!(
            err.downcast_ref::<ConnectorError>(),
            Some(Self::ConnectionFailed(_))
        )
    }
}
