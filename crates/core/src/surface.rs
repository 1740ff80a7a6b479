//! Preview surface collaborator.
//!
//! The surface owner hands out the [`RenderTarget`] the media session draws
//! its preview into, and notifies registered listeners as the surface is
//! created, resized and destroyed.

use std::sync::Arc;

/// Opaque identifier of a rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTarget(pub u64);

/// Registration token returned by [`SurfaceOwner::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Owner of the preview surface.
pub trait SurfaceOwner: Send + Sync {
    fn render_target(&self) -> RenderTarget;

    /// Whether the surface currently exists. Read once when a listener is
    /// attached; later changes arrive through the listener.
    fn is_available(&self) -> bool;

    fn add_listener(&self, listener: Arc<dyn SurfaceListener>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

/// Surface lifecycle notifications.
pub trait SurfaceListener: Send + Sync {
    fn created(&self);

    fn changed(&self, width: u32, height: u32, format: i32);

    fn destroyed(&self);
}
