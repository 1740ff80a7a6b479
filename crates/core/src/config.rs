use std::time::Duration;

use crate::endpoint::Credentials;

/// Default RTSP publish URL.
pub const DEFAULT_STREAM_URL: &str = "rtsp://127.0.0.1:1935/live/camera";

/// How long a start/stop request may wait for its acknowledgement callback.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Audio sampling parameters handed to the media backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioQuality {
    /// Sampling rate in Hz.
    pub sampling_rate: u32,
    /// Encoder bit rate in bits per second.
    pub bit_rate: u32,
}

impl Default for AudioQuality {
    fn default() -> Self {
        Self {
            sampling_rate: 8000,
            bit_rate: 16000,
        }
    }
}

/// Audio track configuration. `None` publishes video only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioProfile {
    #[default]
    None,
    Aac(AudioQuality),
    Amr(AudioQuality),
}

impl AudioProfile {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AudioProfile::None)
    }
}

/// Video encoder. Only H.264 is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    #[default]
    H264,
}

/// Media session settings used when the session is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSettings {
    pub audio: AudioProfile,
    pub video: VideoCodec,
    /// Camera preview rotation in degrees.
    pub preview_orientation: u16,
}

/// Tuning for the controller's request worker.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on waiting for `session_started` / `session_stopped`
    /// before the next queued request is processed anyway.
    pub ack_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }
}

/// Process-wide publisher configuration, loaded before the controller is built.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Publish URL, `rtsp://host:port/path`.
    pub stream_url: String,
    pub credentials: Credentials,
    pub session: SessionSettings,
    pub controller: ControllerConfig,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            credentials: Credentials::default(),
            session: SessionSettings::default(),
            controller: ControllerConfig::default(),
        }
    }
}
