//! Single-writer request worker.
//!
//! The worker thread is the only code that starts, stops or releases the
//! media session and the stream client. Controller methods and collaborator
//! listeners talk to it through one command channel.
//!
//! ## Request serialization
//!
//! ```text
//! Request ──> nothing in flight    ──> decide from is_streaming ──> issue start/stop
//!        └──> transition in flight ──> queue (FIFO)
//!
//! Starting  settled by session_started or any routed error
//! Stopping  settled by session_stopped or any routed error
//! (either)  settled by ack timeout
//! ```
//!
//! Shutdown and surface notifications bypass the queue.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::client::ClientHandle;
use crate::error::{BackendError, Resource, Result, StreamError};
use crate::media::SessionHandle;
use crate::surface::{ListenerId, SurfaceOwner};

use super::StreamingState;

/// Lifecycle request from the controller's public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
    Toggle,
    Activate,
    Deactivate,
}

impl Request {
    fn desired(self, current: StreamingState) -> StreamingState {
        match self {
            Request::Toggle => current.flipped(),
            Request::Activate => StreamingState::Active,
            Request::Deactivate => StreamingState::Idle,
        }
    }
}

/// Acknowledgement posted by a collaborator listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ack {
    Started,
    Stopped,
    Failed,
}

pub(crate) enum Command {
    Request(Request),
    Settled(Ack),
    SurfaceCreated,
    SurfaceDestroyed,
    Shutdown(Sender<Result<()>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Starting,
    Stopping,
}

struct Pending {
    transition: Transition,
    /// `None` when the timeout is too large to represent; waits indefinitely.
    deadline: Option<Instant>,
}

pub(crate) struct Worker {
    session: SessionHandle,
    client: ClientHandle,
    surface: Arc<dyn SurfaceOwner>,
    surface_listener: ListenerId,
    surface_ready: bool,
    /// Activation requested while the surface was missing.
    deferred: bool,
    pending: Option<Pending>,
    queued: VecDeque<Request>,
    ack_timeout: Duration,
    released: bool,
}

impl Worker {
    pub(crate) fn new(
        session: SessionHandle,
        client: ClientHandle,
        surface: Arc<dyn SurfaceOwner>,
        surface_listener: ListenerId,
        surface_ready: bool,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            session,
            client,
            surface,
            surface_listener,
            surface_ready,
            deferred: false,
            pending: None,
            queued: VecDeque::new(),
            ack_timeout,
            released: false,
        }
    }

    pub(crate) fn run(mut self, commands: Receiver<Command>) {
        loop {
            if self.pending.is_none() {
                if let Some(request) = self.queued.pop_front() {
                    self.apply(request);
                    continue;
                }
            }

            let command = match self.pending.as_ref().and_then(|p| p.deadline) {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match commands.recv_timeout(wait) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => {
                            self.expire();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match commands.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            match command {
                Command::Request(request) => {
                    if self.pending.is_some() {
                        tracing::debug!(
                            ?request,
                            queued = self.queued.len() + 1,
                            "request queued behind in-flight transition"
                        );
                    }
                    self.queued.push_back(request);
                }
                Command::Settled(ack) => self.settle(ack),
                Command::SurfaceCreated => self.surface_created(),
                Command::SurfaceDestroyed => {
                    self.surface_ready = false;
                }
                Command::Shutdown(reply) => {
                    let result = self.release();
                    let _ = reply.send(result);
                    return;
                }
            }
        }
        tracing::debug!("controller channel closed");
    }

    /// Current state, read from the client at decision time.
    fn streaming_state(&self) -> StreamingState {
        StreamingState::from_streaming(self.client.lock().is_streaming())
    }

    fn apply(&mut self, request: Request) {
        let current = if self.deferred {
            StreamingState::Active
        } else {
            self.streaming_state()
        };
        let desired = request.desired(current);

        if desired == current {
            tracing::debug!(?request, state = ?current, "request is a no-op");
            return;
        }

        match desired {
            StreamingState::Active => self.start(),
            StreamingState::Idle if self.deferred => {
                self.deferred = false;
                tracing::info!("deferred activation cancelled");
            }
            StreamingState::Idle => self.stop(),
        }
    }

    fn start(&mut self) {
        if !self.surface_ready {
            self.deferred = true;
            tracing::info!("preview surface unavailable, deferring activation");
            return;
        }
        self.deferred = false;
        self.begin(Transition::Starting);

        tracing::info!("starting preview and stream");
        self.session.lock().start_preview();
        self.client.lock().start_stream();
    }

    /// Preview stops before the stream.
    fn stop(&mut self) {
        self.begin(Transition::Stopping);

        tracing::info!("stopping preview and stream");
        self.session.lock().stop_preview();
        self.client.lock().stop_stream();
    }

    fn begin(&mut self, transition: Transition) {
        self.pending = Some(Pending {
            transition,
            deadline: Instant::now().checked_add(self.ack_timeout),
        });
    }

    fn settle(&mut self, ack: Ack) {
        let Some(pending) = &self.pending else {
            tracing::trace!(?ack, "acknowledgement with nothing in flight");
            return;
        };

        let matches = matches!(
            (pending.transition, ack),
            (Transition::Starting, Ack::Started)
                | (Transition::Stopping, Ack::Stopped)
                | (_, Ack::Failed)
        );
        if matches {
            tracing::debug!(transition = ?pending.transition, ?ack, "transition settled");
            self.pending = None;
        } else {
            tracing::trace!(transition = ?pending.transition, ?ack, "unrelated acknowledgement");
        }
    }

    fn expire(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::warn!(
                transition = ?pending.transition,
                timeout = ?self.ack_timeout,
                "no acknowledgement before timeout, resuming queue"
            );
        }
    }

    fn surface_created(&mut self) {
        self.surface_ready = true;
        if self.deferred && self.pending.is_none() {
            tracing::info!("preview surface ready, resuming deferred activation");
            self.start();
        }
    }

    /// Release client, then session, then detach from the surface.
    /// Both releases run even if the first fails or panics; the first failure is returned.
    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if !self.queued.is_empty() {
            tracing::debug!(dropped = self.queued.len(), "dropping queued requests at teardown");
        }
        self.queued.clear();
        self.pending = None;
        self.deferred = false;

        let client = release_guarded(Resource::Client, || self.client.lock().release());
        let session = release_guarded(Resource::Session, || self.session.lock().release());
        self.surface.remove_listener(self.surface_listener);

        for result in [&client, &session] {
            if let Err(e) = result {
                tracing::error!(error = %e, "teardown release failed");
            }
        }
        tracing::info!("stream controller released");

        client.and(session)
    }
}

/// Run one collaborator release, turning both an error and a panic into
/// [`StreamError::ReleaseFailed`] so the next release still runs.
fn release_guarded(
    resource: Resource,
    release: impl FnOnce() -> std::result::Result<(), BackendError>,
) -> Result<()> {
    let reason = match panic::catch_unwind(AssertUnwindSafe(release)) {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("release panicked: {}", panic_message(payload.as_ref())),
    };
    Err(StreamError::ReleaseFailed { resource, reason })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
