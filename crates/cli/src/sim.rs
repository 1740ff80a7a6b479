//! In-process stand-ins for the camera, RTSP client, preview surface and
//! alert dialog. Each completes its work on a background thread after a
//! fixed latency, like a real capture or network stack would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use camstream::{
    Alert, BackendError, ClientBackend, ClientListener, ClientStatus, Credentials, ListenerId,
    MediaBackend, MediaListener, MediaSession, RenderTarget, SessionHandle, SessionSettings,
    StreamClient, StreamEndpoint, SurfaceListener, SurfaceOwner, UserNotifier,
};
use parking_lot::Mutex;

/// Rough H.264 output at 640x480, in bytes per second.
const SIM_VIDEO_BYTES_PER_SEC: u64 = 62_500;
const SIM_AUDIO_BYTES_PER_SEC: u64 = 2_000;

fn after(latency: Duration, f: impl FnOnce() + Send + 'static) {
    thread::spawn(move || {
        thread::sleep(latency);
        f();
    });
}

pub struct SimMedia {
    pub latency: Duration,
}

impl MediaBackend for SimMedia {
    fn configure(
        &self,
        settings: &SessionSettings,
        target: RenderTarget,
        listener: Arc<dyn MediaListener>,
    ) -> Result<Box<dyn MediaSession>, BackendError> {
        tracing::info!(?settings, surface = target.0, "sim: media session configured");
        let bitrate = if settings.audio.is_enabled() {
            SIM_VIDEO_BYTES_PER_SEC + SIM_AUDIO_BYTES_PER_SEC
        } else {
            SIM_VIDEO_BYTES_PER_SEC
        };
        Ok(Box::new(SimSession {
            listener,
            latency: self.latency,
            bitrate,
        }))
    }
}

struct SimSession {
    listener: Arc<dyn MediaListener>,
    latency: Duration,
    bitrate: u64,
}

impl MediaSession for SimSession {
    fn start_preview(&mut self) {
        let listener = self.listener.clone();
        let bitrate = self.bitrate;
        after(self.latency, move || {
            listener.preview_started();
            listener.session_configured();
            listener.session_started();
            listener.bitrate_update(bitrate);
        });
    }

    fn stop_preview(&mut self) {
        let listener = self.listener.clone();
        after(self.latency, move || listener.session_stopped());
    }

    fn release(&mut self) -> Result<(), BackendError> {
        tracing::info!("sim: camera released");
        Ok(())
    }
}

pub struct SimClient {
    pub latency: Duration,
    /// Reject the publisher with 401 on every connection attempt.
    pub reject_credentials: bool,
}

impl ClientBackend for SimClient {
    fn configure(
        &self,
        _session: SessionHandle,
        endpoint: &StreamEndpoint,
        credentials: &Credentials,
        listener: Arc<dyn ClientListener>,
    ) -> Result<Box<dyn StreamClient>, BackendError> {
        tracing::info!(%endpoint, username = %credentials.username, "sim: client configured");
        Ok(Box::new(SimConnection {
            listener,
            latency: self.latency,
            reject_credentials: self.reject_credentials,
            streaming: Arc::new(AtomicBool::new(false)),
        }))
    }
}

struct SimConnection {
    listener: Arc<dyn ClientListener>,
    latency: Duration,
    reject_credentials: bool,
    streaming: Arc<AtomicBool>,
}

impl StreamClient for SimConnection {
    fn start_stream(&mut self) {
        self.streaming.store(true, Ordering::SeqCst);
        if self.reject_credentials {
            let listener = self.listener.clone();
            let streaming = self.streaming.clone();
            after(self.latency / 2, move || {
                streaming.store(false, Ordering::SeqCst);
                listener.status_update(
                    ClientStatus::WrongCredentials,
                    Some("401 Unauthorized".to_string()),
                );
            });
        }
    }

    fn stop_stream(&mut self) {
        self.streaming.store(false, Ordering::SeqCst);
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    fn release(&mut self) -> Result<(), BackendError> {
        tracing::info!("sim: connection released");
        Ok(())
    }
}

#[derive(Default)]
pub struct SimSurface {
    available: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn SurfaceListener>)>>,
}

impl SimSurface {
    pub fn create(&self, width: u32, height: u32) {
        self.available.store(true, Ordering::SeqCst);
        for (_, listener) in self.listeners.lock().iter() {
            listener.created();
            listener.changed(width, height, 4);
        }
    }
}

impl SurfaceOwner for SimSurface {
    fn render_target(&self) -> RenderTarget {
        RenderTarget(1)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn add_listener(&self, listener: Arc<dyn SurfaceListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }
}

pub struct ConsoleNotifier;

impl UserNotifier for ConsoleNotifier {
    fn alert(&self, alert: Alert) {
        println!("[alert] {}  [{}]", alert.message, alert.acknowledge);
    }
}
