//! Stream client collaborator: the RTSP publish connection.
//!
//! The client owns the control connection to the RTSP server (ANNOUNCE,
//! SETUP, RECORD) and pulls encoded frames from the media session it was
//! configured with. Its state is the single source of truth for whether the
//! controller is streaming; see [`StreamingState`](crate::StreamingState).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::endpoint::{Credentials, StreamEndpoint};
use crate::error::BackendError;
use crate::media::SessionHandle;

/// Handle to the configured client, owned by the controller.
///
/// The controller's worker issues every start, stop and release; other
/// threads only read [`StreamClient::is_streaming`] through it.
pub type ClientHandle = Arc<Mutex<Box<dyn StreamClient>>>;

/// Builds stream clients.
pub trait ClientBackend {
    /// Configure a client that publishes `session` to `endpoint`,
    /// authenticating with `credentials` and reporting to `listener`.
    fn configure(
        &self,
        session: SessionHandle,
        endpoint: &StreamEndpoint,
        credentials: &Credentials,
        listener: Arc<dyn ClientListener>,
    ) -> Result<Box<dyn StreamClient>, BackendError>;
}

/// A configured RTSP publish client.
pub trait StreamClient: Send {
    /// Connect and start publishing. Returns immediately.
    fn start_stream(&mut self);

    /// Stop publishing and close the connection. Returns immediately.
    fn stop_stream(&mut self);

    fn is_streaming(&self) -> bool;

    /// Close the socket for good. Called exactly once.
    fn release(&mut self) -> Result<(), BackendError>;
}

/// Callback sink for client status. May be invoked from the network thread.
pub trait ClientListener: Send + Sync {
    fn status_update(&self, status: ClientStatus, detail: Option<String>);
}

/// Status reported by the stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// The server could not be reached or refused the session.
    ConnectionFailed,
    /// The server rejected the publisher credentials.
    WrongCredentials,
    /// An established connection dropped; the client retries on its own.
    ConnectionLost,
    /// The client re-established a lost connection.
    ConnectionRecovered,
}

impl ClientStatus {
    /// Whether this status must be surfaced to the user.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ConnectionFailed | Self::WrongCredentials)
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection failed"),
            Self::WrongCredentials => write!(f, "wrong credentials"),
            Self::ConnectionLost => write!(f, "connection lost"),
            Self::ConnectionRecovered => write!(f, "connection recovered"),
        }
    }
}
