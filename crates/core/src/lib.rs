pub mod client;
pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod notify;
pub mod surface;

pub use client::{ClientBackend, ClientHandle, ClientListener, ClientStatus, StreamClient};
pub use config::{
    AudioProfile, AudioQuality, ControllerConfig, PublisherConfig, SessionSettings, VideoCodec,
};
pub use controller::{Collaborators, StreamController, StreamingState};
pub use endpoint::{Credentials, StreamEndpoint};
pub use error::{BackendError, EndpointErrorKind, Resource, Result, StreamError};
pub use lifecycle::ScreenLifecycle;
pub use media::{
    MediaBackend, MediaErrorKind, MediaListener, MediaSession, SessionHandle, StreamType,
};
pub use notify::{Alert, UserNotifier};
pub use surface::{ListenerId, RenderTarget, SurfaceListener, SurfaceOwner};
