//! Host screen lifecycle mapping.
//!
//! The host application reports its screen lifecycle
//! (`create → resume ⇄ pause → destroy`). [`ScreenLifecycle`] turns those
//! events into controller construction, explicit activate/deactivate
//! requests and teardown, so a missed or repeated event cannot invert the
//! streaming state the way an unconditional toggle would.

use crate::controller::{StreamController, StreamingState};
use crate::error::{Result, StreamError};

/// Screen-scoped owner of at most one [`StreamController`].
pub struct ScreenLifecycle<F>
where
    F: FnMut() -> Result<StreamController>,
{
    build: F,
    controller: Option<StreamController>,
}

impl<F> ScreenLifecycle<F>
where
    F: FnMut() -> Result<StreamController>,
{
    /// `build` is called on every [`on_create`](Self::on_create) that is not
    /// rejected as a double initialization.
    pub fn new(build: F) -> Self {
        Self {
            build,
            controller: None,
        }
    }

    /// Build the controller. Fails if one already exists.
    pub fn on_create(&mut self) -> Result<()> {
        if self.controller.is_some() {
            tracing::warn!("screen created twice without destroy");
            return Err(StreamError::AlreadyInitialized);
        }
        self.controller = Some((self.build)()?);
        tracing::info!("screen created");
        Ok(())
    }

    /// Screen became visible.
    pub fn on_resume(&mut self) -> Result<()> {
        self.controller()?.activate()
    }

    /// Screen was hidden.
    pub fn on_pause(&mut self) -> Result<()> {
        self.controller()?.deactivate()
    }

    /// Tear down the controller. A screen that was never created is a no-op.
    pub fn on_destroy(&mut self) -> Result<()> {
        match self.controller.take() {
            Some(controller) => {
                tracing::info!("screen destroyed");
                controller.shutdown()
            }
            None => Ok(()),
        }
    }

    pub fn controller(&self) -> Result<&StreamController> {
        self.controller.as_ref().ok_or(StreamError::NotInitialized)
    }

    pub fn is_created(&self) -> bool {
        self.controller.is_some()
    }

    /// Streaming state, or `Idle` when no controller exists.
    pub fn state(&self) -> StreamingState {
        self.controller
            .as_ref()
            .map_or(StreamingState::Idle, StreamController::state)
    }
}
