//! # Plinth Core Event System
//!
//! Lifecycle notifications raised by the extension kernel. Handlers subscribe
//! either by event name or by concrete event type and run in registration
//! order; any handler may stop propagation.
pub mod dispatcher;
pub mod error;
pub mod manager;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

/// Handler identifier handed out on registration
pub type EventId = u64;

/// Whether later handlers get to see the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Stop,
}

/// Something the kernel can announce
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Name handlers subscribe to, e.g. `extension.booted`
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> EventResult;
}

pub use dispatcher::EventDispatcher;
pub use error::EventSystemError;
pub use manager::{DefaultEventManager, EventManager};
pub use types::ExtensionEvent;

#[cfg(test)]
mod tests;
