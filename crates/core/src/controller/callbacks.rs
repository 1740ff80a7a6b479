//! Listener objects handed to each collaborator.
//!
//! Every collaborator gets its own small listener instead of one object
//! implementing all callback traits. Listeners never touch the session or
//! client handles: they forward user-facing errors to the [`UserNotifier`]
//! and post acknowledgements to the worker's command queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

use crate::client::{ClientListener, ClientStatus};
use crate::media::{MediaErrorKind, MediaListener, StreamType};
use crate::notify::{Alert, UserNotifier};
use crate::surface::SurfaceListener;

use super::worker::{Ack, Command};

/// Shown when a transport error arrives without any detail text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Returns the detail text unless it is absent or empty.
fn non_empty(detail: Option<String>) -> Option<String> {
    detail.filter(|d| !d.is_empty())
}

/// Receives [`MediaSession`](crate::MediaSession) events.
pub(crate) struct MediaCallbacks {
    notifier: Arc<dyn UserNotifier>,
    commands: Sender<Command>,
    bitrate: Arc<AtomicU64>,
}

impl MediaCallbacks {
    pub(crate) fn new(
        notifier: Arc<dyn UserNotifier>,
        commands: Sender<Command>,
        bitrate: Arc<AtomicU64>,
    ) -> Self {
        Self {
            notifier,
            commands,
            bitrate,
        }
    }

    fn ack(&self, ack: Ack) {
        // The worker is gone after teardown; late callbacks are dropped.
        let _ = self.commands.send(Command::Settled(ack));
    }
}

impl MediaListener for MediaCallbacks {
    fn bitrate_update(&self, bytes_per_second: u64) {
        self.bitrate.store(bytes_per_second, Ordering::Relaxed);
        tracing::trace!(bytes_per_second, "bitrate update");
    }

    fn preview_started(&self) {
        tracing::debug!("preview started");
    }

    fn session_configured(&self) {
        tracing::debug!("media session configured");
    }

    fn session_started(&self) {
        tracing::info!("media session started");
        self.ack(Ack::Started);
    }

    fn session_stopped(&self) {
        tracing::info!("media session stopped");
        self.bitrate.store(0, Ordering::Relaxed);
        self.ack(Ack::Stopped);
    }

    fn session_error(
        &self,
        kind: MediaErrorKind,
        stream: Option<StreamType>,
        detail: Option<String>,
    ) {
        match non_empty(detail) {
            Some(message) => {
                tracing::warn!(%kind, ?stream, %message, "media session error");
                self.notifier.alert(Alert::new(message));
            }
            None => tracing::warn!(%kind, ?stream, "media session error without detail"),
        }
        self.ack(Ack::Failed);
    }
}

/// Receives [`StreamClient`](crate::StreamClient) status updates.
pub(crate) struct ClientCallbacks {
    notifier: Arc<dyn UserNotifier>,
    commands: Sender<Command>,
}

impl ClientCallbacks {
    pub(crate) fn new(notifier: Arc<dyn UserNotifier>, commands: Sender<Command>) -> Self {
        Self { notifier, commands }
    }
}

impl ClientListener for ClientCallbacks {
    fn status_update(&self, status: ClientStatus, detail: Option<String>) {
        if !status.is_error() {
            tracing::info!(%status, ?detail, "stream client status");
            return;
        }

        let message = non_empty(detail).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        tracing::warn!(%status, %message, "stream client error");
        self.notifier.alert(Alert::new(message));
        let _ = self.commands.send(Command::Settled(Ack::Failed));
    }
}

/// Tracks preview surface availability for the worker.
pub(crate) struct SurfaceCallbacks {
    commands: Sender<Command>,
}

impl SurfaceCallbacks {
    pub(crate) fn new(commands: Sender<Command>) -> Self {
        Self { commands }
    }
}

impl SurfaceListener for SurfaceCallbacks {
    fn created(&self) {
        tracing::debug!("preview surface created");
        let _ = self.commands.send(Command::SurfaceCreated);
    }

    fn changed(&self, width: u32, height: u32, format: i32) {
        tracing::debug!(width, height, format, "preview surface changed");
    }

    fn destroyed(&self) {
        tracing::debug!("preview surface destroyed");
        let _ = self.commands.send(Command::SurfaceDestroyed);
    }
}
