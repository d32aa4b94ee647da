use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::event::dispatcher::{self, EventDispatcher, NamedHandlerFn};
use crate::event::error::EventSystemError;
use crate::event::{Event, EventId, EventResult};

/// Event sink the extension kernel announces lifecycle phases to
#[async_trait]
pub trait EventManager: Debug + Send + Sync {
    async fn register_handler(&self, event_name: &'static str, handler: NamedHandlerFn) -> EventId;

    async fn unregister_handler(&self, id: EventId) -> Result<(), EventSystemError>;

    /// Run every subscriber now, in registration order
    async fn dispatch(&self, event: &dyn Event) -> EventResult;
}

/// [`EventManager`] backed by a shared [`EventDispatcher`]. Clones share
/// their subscribers.
#[derive(Clone, Debug, Default)]
pub struct DefaultEventManager {
    dispatcher: Arc<EventDispatcher>,
}

impl DefaultEventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub async fn register_sync_handler<F>(&self, event_name: &'static str, handler: F) -> EventId
    where
        F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
    {
        self.register_handler(event_name, dispatcher::sync_event_handler(handler))
            .await
    }

    pub async fn register_sync_type_handler<E, F>(&self, handler: F) -> EventId
    where
        E: Event,
        F: Fn(&E) -> EventResult + Send + Sync + 'static,
    {
        self.dispatcher
            .register_type_handler::<E>(dispatcher::sync_typed_handler(handler))
            .await
    }
}

#[async_trait]
impl EventManager for DefaultEventManager {
    async fn register_handler(&self, event_name: &'static str, handler: NamedHandlerFn) -> EventId {
        self.dispatcher.register_handler(event_name, handler).await
    }

    async fn unregister_handler(&self, id: EventId) -> Result<(), EventSystemError> {
        self.dispatcher.unregister_handler(id).await
    }

    async fn dispatch(&self, event: &dyn Event) -> EventResult {
        self.dispatcher.dispatch(event).await
    }
}
