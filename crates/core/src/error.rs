//! Error types for the stream controller library.

use std::fmt;

/// Errors that can occur while building or driving a [`StreamController`](crate::StreamController).
///
/// Variants map to specific failure modes across the stack:
///
/// - **Configuration**: [`MalformedEndpoint`](Self::MalformedEndpoint) — the
///   stream URL does not have the `rtsp://host:port/path` shape. Fatal to
///   construction.
/// - **Collaborators**: [`Collaborator`](Self::Collaborator) — the media or
///   client backend refused to configure.
/// - **Lifecycle**: [`AlreadyInitialized`](Self::AlreadyInitialized),
///   [`NotInitialized`](Self::NotInitialized),
///   [`ControllerStopped`](Self::ControllerStopped).
/// - **Teardown**: [`ReleaseFailed`](Self::ReleaseFailed).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The configured stream URL could not be resolved into an endpoint.
    #[error("malformed endpoint: {kind}")]
    MalformedEndpoint { kind: EndpointErrorKind },

    /// A media or client backend reported a failure synchronously.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] BackendError),

    /// The screen already owns a controller.
    #[error("stream controller already initialized")]
    AlreadyInitialized,

    /// A lifecycle event arrived before the controller was created.
    #[error("stream controller not initialized")]
    NotInitialized,

    /// The worker thread has exited; no further requests are accepted.
    #[error("stream controller stopped")]
    ControllerStopped,

    /// Releasing a collaborator failed during teardown.
    #[error("failed to release {resource}: {reason}")]
    ReleaseFailed { resource: Resource, reason: String },

    /// Spawning the worker thread failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specific reason a stream URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointErrorKind {
    /// The URL does not start with `rtsp://`.
    MissingScheme,
    /// No host before the `:port` part.
    MissingHost,
    /// The authority has no `:port` suffix.
    MissingPort,
    /// The port is not a decimal number in 1..=65535.
    InvalidPort,
    /// Nothing after the `/` following the port.
    MissingPath,
}

impl fmt::Display for EndpointErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingScheme => write!(f, "missing rtsp:// scheme"),
            Self::MissingHost => write!(f, "missing host"),
            Self::MissingPort => write!(f, "missing port"),
            Self::InvalidPort => write!(f, "invalid port"),
            Self::MissingPath => write!(f, "missing stream path"),
        }
    }
}

/// Collaborator owning an OS resource that must be released at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The RTSP client connection.
    Client,
    /// The camera/microphone media session.
    Session,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "stream client"),
            Self::Session => write!(f, "media session"),
        }
    }
}

/// Failure reported by a collaborator backend (media session, stream client).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Convenience alias for `Result<T, StreamError>`.
pub type Result<T> = std::result::Result<T, StreamError>;
