//! Recording mock collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use camstream::{
    Alert, BackendError, ClientBackend, ClientListener, Collaborators, Credentials, ListenerId,
    MediaBackend, MediaListener, MediaSession, PublisherConfig, RenderTarget, SessionHandle,
    SessionSettings, StreamClient, StreamController, StreamEndpoint, SurfaceListener,
    SurfaceOwner, UserNotifier,
};

pub const TEST_URL: &str = "rtsp://192.168.0.20:1935/live/phone";

/// Every collaborator call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ConfigureSession,
    ConfigureClient,
    StartPreview,
    StopPreview,
    StartStream,
    StopStream,
    ReleaseClient,
    ReleaseSession,
    AddSurfaceListener,
    RemoveSurfaceListener,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.alerts.lock().iter().map(|a| a.message.clone()).collect()
    }
}

impl UserNotifier for RecordingNotifier {
    fn alert(&self, alert: Alert) {
        self.alerts.lock().push(alert);
    }
}

pub struct MockSurface {
    calls: CallLog,
    available: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn SurfaceListener>)>>,
}

impl MockSurface {
    pub fn fire_created(&self) {
        self.available.store(true, Ordering::SeqCst);
        for (_, listener) in self.listeners.lock().iter() {
            listener.created();
        }
    }

    pub fn fire_destroyed(&self) {
        self.available.store(false, Ordering::SeqCst);
        for (_, listener) in self.listeners.lock().iter() {
            listener.destroyed();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl SurfaceOwner for MockSurface {
    fn render_target(&self) -> RenderTarget {
        RenderTarget(7)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn add_listener(&self, listener: Arc<dyn SurfaceListener>) -> ListenerId {
        self.calls.lock().push(Call::AddSurfaceListener);
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.calls.lock().push(Call::RemoveSurfaceListener);
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }
}

/// Knobs and observation points shared by the mock backends.
#[derive(Default)]
pub struct Shared {
    pub calls: CallLog,
    pub streaming: AtomicBool,
    /// Media session acknowledges start/stop inline.
    pub auto_ack: AtomicBool,
    pub fail_session_configure: AtomicBool,
    pub fail_client_configure: AtomicBool,
    pub fail_client_release: AtomicBool,
    pub panic_client_release: AtomicBool,
    pub fail_session_release: AtomicBool,
    pub media_listener: Mutex<Option<Arc<dyn MediaListener>>>,
    pub client_listener: Mutex<Option<Arc<dyn ClientListener>>>,
    pub settings: Mutex<Option<(SessionSettings, RenderTarget)>>,
    pub client_config: Mutex<Option<(StreamEndpoint, Credentials)>>,
}

impl Shared {
    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

struct MockSession {
    shared: Arc<Shared>,
}

impl MediaSession for MockSession {
    fn start_preview(&mut self) {
        self.shared.record(Call::StartPreview);
        if self.shared.auto_ack.load(Ordering::SeqCst) {
            if let Some(listener) = self.shared.media_listener.lock().clone() {
                listener.session_started();
            }
        }
    }

    fn stop_preview(&mut self) {
        self.shared.record(Call::StopPreview);
        if self.shared.auto_ack.load(Ordering::SeqCst) {
            if let Some(listener) = self.shared.media_listener.lock().clone() {
                listener.session_stopped();
            }
        }
    }

    fn release(&mut self) -> Result<(), BackendError> {
        self.shared.record(Call::ReleaseSession);
        if self.shared.fail_session_release.load(Ordering::SeqCst) {
            return Err(BackendError::new("camera device stuck"));
        }
        Ok(())
    }
}

struct MockClient {
    shared: Arc<Shared>,
    _session: SessionHandle,
}

impl StreamClient for MockClient {
    fn start_stream(&mut self) {
        self.shared.record(Call::StartStream);
        self.shared.streaming.store(true, Ordering::SeqCst);
    }

    fn stop_stream(&mut self) {
        self.shared.record(Call::StopStream);
        self.shared.streaming.store(false, Ordering::SeqCst);
    }

    fn is_streaming(&self) -> bool {
        self.shared.streaming.load(Ordering::SeqCst)
    }

    fn release(&mut self) -> Result<(), BackendError> {
        self.shared.record(Call::ReleaseClient);
        if self.shared.panic_client_release.load(Ordering::SeqCst) {
            panic!("socket close threw");
        }
        if self.shared.fail_client_release.load(Ordering::SeqCst) {
            return Err(BackendError::new("socket close failed"));
        }
        Ok(())
    }
}

pub struct MockMedia(pub Arc<Shared>);

impl MediaBackend for MockMedia {
    fn configure(
        &self,
        settings: &SessionSettings,
        target: RenderTarget,
        listener: Arc<dyn MediaListener>,
    ) -> Result<Box<dyn MediaSession>, BackendError> {
        self.0.record(Call::ConfigureSession);
        if self.0.fail_session_configure.load(Ordering::SeqCst) {
            return Err(BackendError::new("no camera"));
        }
        *self.0.settings.lock() = Some((*settings, target));
        *self.0.media_listener.lock() = Some(listener);
        Ok(Box::new(MockSession {
            shared: self.0.clone(),
        }))
    }
}

pub struct MockClientBackend(pub Arc<Shared>);

impl ClientBackend for MockClientBackend {
    fn configure(
        &self,
        session: SessionHandle,
        endpoint: &StreamEndpoint,
        credentials: &Credentials,
        listener: Arc<dyn ClientListener>,
    ) -> Result<Box<dyn StreamClient>, BackendError> {
        self.0.record(Call::ConfigureClient);
        if self.0.fail_client_configure.load(Ordering::SeqCst) {
            return Err(BackendError::new("no network"));
        }
        *self.0.client_config.lock() = Some((endpoint.clone(), credentials.clone()));
        *self.0.client_listener.lock() = Some(listener);
        Ok(Box::new(MockClient {
            shared: self.0.clone(),
            _session: session,
        }))
    }
}

/// A full set of mock collaborators plus a config pointing at [`TEST_URL`].
pub struct Harness {
    pub shared: Arc<Shared>,
    pub surface: Arc<MockSurface>,
    pub notifier: Arc<RecordingNotifier>,
    pub config: PublisherConfig,
}

impl Harness {
    pub fn new() -> Self {
        let shared = Arc::new(Shared::default());
        shared.auto_ack.store(true, Ordering::SeqCst);
        let surface = Arc::new(MockSurface {
            calls: shared.calls.clone(),
            available: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        });
        let config = PublisherConfig {
            stream_url: TEST_URL.to_string(),
            credentials: Credentials::new("publisher", "hunter2"),
            ..PublisherConfig::default()
        };
        Self {
            shared,
            surface,
            notifier: Arc::new(RecordingNotifier::default()),
            config,
        }
    }

    pub fn manual_ack(self) -> Self {
        self.shared.auto_ack.store(false, Ordering::SeqCst);
        self
    }

    pub fn surface_missing(self) -> Self {
        self.surface.available.store(false, Ordering::SeqCst);
        self
    }

    pub fn build(&self) -> camstream::Result<StreamController> {
        StreamController::new(
            &self.config,
            Collaborators {
                media: &MockMedia(self.shared.clone()),
                client: &MockClientBackend(self.shared.clone()),
                surface: self.surface.clone(),
                notifier: self.notifier.clone(),
            },
        )
    }

    /// Calls after construction, i.e. without the configure/listener setup.
    pub fn stream_calls(&self) -> Vec<Call> {
        self.shared
            .calls
            .lock()
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    Call::ConfigureSession | Call::ConfigureClient | Call::AddSurfaceListener
                )
            })
            .cloned()
            .collect()
    }

    pub fn media_listener(&self) -> Arc<dyn MediaListener> {
        self.shared
            .media_listener
            .lock()
            .clone()
            .expect("media session configured")
    }

    pub fn client_listener(&self) -> Arc<dyn ClientListener> {
        self.shared
            .client_listener
            .lock()
            .clone()
            .expect("stream client configured")
    }

    /// Wait until `count` stream calls have been recorded.
    pub fn wait_for_calls(&self, count: usize) -> Vec<Call> {
        wait_until(|| self.stream_calls().len() >= count);
        self.stream_calls()
    }
}

/// Poll `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within 2s");
        thread::sleep(Duration::from_millis(5));
    }
}

/// Give the worker time to (not) act.
pub fn settle() {
    thread::sleep(Duration::from_millis(100));
}
