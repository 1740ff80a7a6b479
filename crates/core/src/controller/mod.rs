//! Stream session lifecycle controller.
//!
//! [`StreamController`] pairs one media session with one stream client for
//! its whole lifetime and decides when both should run. It resolves the
//! publish endpoint, configures both collaborators, and forwards lifecycle
//! requests to a worker thread that serializes them.
//!
//! ## States
//!
//! ```text
//! Idle   --activate / toggle-->    Active   (start_preview, then start_stream)
//! Active --deactivate / toggle-->  Idle     (stop_preview, then stop_stream)
//! ```
//!
//! The state is never stored: it is read from
//! [`StreamClient::is_streaming`](crate::StreamClient::is_streaming) when a
//! request is decided.

mod callbacks;
mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::client::{ClientBackend, ClientHandle};
use crate::config::PublisherConfig;
use crate::endpoint::StreamEndpoint;
use crate::error::{Result, StreamError};
use crate::media::{MediaBackend, SessionHandle};
use crate::notify::UserNotifier;
use crate::surface::SurfaceOwner;

pub use callbacks::UNKNOWN_ERROR;
use callbacks::{ClientCallbacks, MediaCallbacks, SurfaceCallbacks};
use worker::{Command, Request, Worker};

/// Whether the controller is currently publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingState {
    /// No preview, no stream.
    Idle,
    /// Preview and stream running.
    Active,
}

impl StreamingState {
    pub fn from_streaming(is_streaming: bool) -> Self {
        if is_streaming {
            StreamingState::Active
        } else {
            StreamingState::Idle
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            StreamingState::Idle => StreamingState::Active,
            StreamingState::Active => StreamingState::Idle,
        }
    }
}

/// External collaborators the controller is built from.
pub struct Collaborators<'a> {
    pub media: &'a dyn MediaBackend,
    pub client: &'a dyn ClientBackend,
    pub surface: Arc<dyn SurfaceOwner>,
    pub notifier: Arc<dyn UserNotifier>,
}

/// Owns the media session and stream client and keeps them in step.
///
/// Requests (`toggle`, `activate`, `deactivate`) return immediately; the
/// collaborators confirm completion later through their callbacks. Dropping
/// the controller releases both collaborators, as does [`shutdown`](Self::shutdown).
pub struct StreamController {
    endpoint: StreamEndpoint,
    client: ClientHandle,
    commands: Sender<Command>,
    bitrate: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl StreamController {
    /// Resolve the endpoint, configure both collaborators and start the
    /// request worker.
    ///
    /// A malformed stream URL or a collaborator that refuses to configure
    /// fails construction; anything acquired up to that point is released.
    pub fn new(config: &PublisherConfig, collaborators: Collaborators<'_>) -> Result<Self> {
        let Collaborators {
            media: media_backend,
            client: client_backend,
            surface,
            notifier,
        } = collaborators;

        let endpoint = StreamEndpoint::parse(&config.stream_url)?;
        tracing::info!(
            host = %endpoint.host,
            port = endpoint.port,
            path = %endpoint.path,
            username = %config.credentials.username,
            "resolved publish endpoint"
        );

        let (commands, receiver) = mpsc::channel();
        let bitrate = Arc::new(AtomicU64::new(0));

        let surface_listener =
            surface.add_listener(Arc::new(SurfaceCallbacks::new(commands.clone())));
        let surface_ready = surface.is_available();

        let media_listener = Arc::new(MediaCallbacks::new(
            notifier.clone(),
            commands.clone(),
            bitrate.clone(),
        ));
        let target = surface.render_target();
        let session: SessionHandle =
            match media_backend.configure(&config.session, target, media_listener) {
                Ok(session) => Arc::new(Mutex::new(session)),
                Err(e) => {
                    surface.remove_listener(surface_listener);
                    return Err(e.into());
                }
            };
        tracing::debug!(settings = ?config.session, "media session configured");

        let client_listener = Arc::new(ClientCallbacks::new(notifier, commands.clone()));
        let client: ClientHandle = match client_backend.configure(
            session.clone(),
            &endpoint,
            &config.credentials,
            client_listener,
        ) {
            Ok(client) => Arc::new(Mutex::new(client)),
            Err(e) => {
                if let Err(release) = session.lock().release() {
                    tracing::warn!(
                        error = %release,
                        "media session release failed after client setup error"
                    );
                }
                surface.remove_listener(surface_listener);
                return Err(e.into());
            }
        };

        let worker = Worker::new(
            session,
            client.clone(),
            surface,
            surface_listener,
            surface_ready,
            config.controller.ack_timeout,
        );
        // A failed spawn drops the worker, which releases both collaborators.
        let handle = thread::Builder::new()
            .name("stream-controller".to_string())
            .spawn(move || worker.run(receiver))?;

        Ok(Self {
            endpoint,
            client,
            commands,
            bitrate,
            worker: Some(handle),
        })
    }

    /// Flip between `Idle` and `Active`, deciding from the client's current state.
    ///
    /// Prefer [`activate`](Self::activate) / [`deactivate`](Self::deactivate):
    /// a missed or duplicated flip leaves the stream in the opposite state.
    pub fn toggle(&self) -> Result<()> {
        self.request(Request::Toggle)
    }

    /// Start preview and stream unless already streaming.
    pub fn activate(&self) -> Result<()> {
        self.request(Request::Activate)
    }

    /// Stop preview and stream unless already idle.
    pub fn deactivate(&self) -> Result<()> {
        self.request(Request::Deactivate)
    }

    fn request(&self, request: Request) -> Result<()> {
        tracing::debug!(?request, "lifecycle request");
        self.commands
            .send(Command::Request(request))
            .map_err(|_| StreamError::ControllerStopped)
    }

    /// Current state as reported by the stream client.
    pub fn state(&self) -> StreamingState {
        StreamingState::from_streaming(self.client.lock().is_streaming())
    }

    pub fn endpoint(&self) -> &StreamEndpoint {
        &self.endpoint
    }

    /// Last reported outgoing bit rate in bytes per second; zero when stopped.
    pub fn bitrate(&self) -> u64 {
        self.bitrate.load(Ordering::Relaxed)
    }

    /// Release the stream client, then the media session, then detach from
    /// the surface. Both releases are attempted even if one fails.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_worker()
    }

    fn stop_worker(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        let (reply, response) = mpsc::channel();
        let result = match self.commands.send(Command::Shutdown(reply)) {
            Ok(()) => response.recv().unwrap_or(Err(StreamError::ControllerStopped)),
            Err(_) => Err(StreamError::ControllerStopped),
        };

        if handle.join().is_err() {
            tracing::error!("stream controller worker panicked");
        }
        result
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        if let Err(e) = self.stop_worker() {
            tracing::warn!(error = %e, "teardown on drop reported an error");
        }
    }
}
