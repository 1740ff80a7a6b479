//! Media session collaborator: camera/microphone capture and encoding.
//!
//! The controller never captures or encodes anything itself. It configures a
//! [`MediaSession`] through a [`MediaBackend`] and asks it to start or stop
//! the camera preview. The session reports progress and failures back through
//! a [`MediaListener`], usually from its own capture/encode thread.
//!
//! ## Event flow
//!
//! ```text
//! start_preview()  -> preview_started, session_configured, session_started
//! stop_preview()   -> session_stopped
//! (any time)       -> bitrate_update, session_error
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SessionSettings;
use crate::error::BackendError;
use crate::surface::RenderTarget;

/// Shared handle to the configured media session.
///
/// The controller owns it and is the only party that starts, stops or
/// releases the session. The stream client receives a clone so it can read
/// encoded frames from the session it is paired with.
pub type SessionHandle = Arc<Mutex<Box<dyn MediaSession>>>;

/// Builds media sessions.
pub trait MediaBackend {
    /// Configure a session for the given audio/video settings, rendering its
    /// preview into `target` and reporting to `listener`.
    fn configure(
        &self,
        settings: &SessionSettings,
        target: RenderTarget,
        listener: Arc<dyn MediaListener>,
    ) -> Result<Box<dyn MediaSession>, BackendError>;
}

/// A configured capture/encode session.
///
/// `start_preview` and `stop_preview` are asynchronous requests: they return
/// immediately and completion arrives later through the [`MediaListener`].
pub trait MediaSession: Send {
    fn start_preview(&mut self);

    fn stop_preview(&mut self);

    /// Free the camera device and encoders. Called exactly once.
    fn release(&mut self) -> Result<(), BackendError>;
}

/// Callback sink for media session events. May be invoked from any thread.
pub trait MediaListener: Send + Sync {
    /// Current outgoing bit rate in bytes per second.
    fn bitrate_update(&self, bytes_per_second: u64);

    fn preview_started(&self);

    fn session_configured(&self);

    /// The session is capturing and encoding.
    fn session_started(&self);

    /// Capture and encoding have stopped.
    fn session_stopped(&self);

    fn session_error(
        &self,
        kind: MediaErrorKind,
        stream: Option<StreamType>,
        detail: Option<String>,
    );
}

/// Failure class reported by the media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    CameraInUse,
    NoFlash,
    InvalidSurface,
    StorageNotReady,
    ConfigurationUnsupported,
    Other,
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CameraInUse => write!(f, "camera already in use"),
            Self::NoFlash => write!(f, "camera has no flash"),
            Self::InvalidSurface => write!(f, "invalid surface"),
            Self::StorageNotReady => write!(f, "storage not ready"),
            Self::ConfigurationUnsupported => write!(f, "configuration not supported"),
            Self::Other => write!(f, "unspecified media error"),
        }
    }
}

/// Media track that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Audio,
    Video,
}
