use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use log::trace;
use tokio::sync::RwLock;

use crate::event::error::EventSystemError;
use crate::event::{AsyncEventHandler, Event, EventId, EventResult};

/// Future returned by a handler callback
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = EventResult> + Send + 'a>>;

/// Callback subscribed to an event name
pub type NamedHandlerFn = Box<dyn Fn(&dyn Event) -> BoxFuture<'_> + Send + Sync>;

/// Callback subscribed to one concrete event type
pub type TypedHandlerFn<E> = Box<dyn Fn(&E) -> BoxFuture<'_> + Send + Sync>;

type HandlerList = Vec<(EventId, Box<dyn AsyncEventHandler>)>;

struct NamedHandler {
    callback: NamedHandlerFn,
}

#[async_trait]
impl AsyncEventHandler for NamedHandler {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        (self.callback)(event).await
    }
}

struct TypedHandler<E: Event> {
    callback: TypedHandlerFn<E>,
}

#[async_trait]
impl<E: Event> AsyncEventHandler for TypedHandler<E> {
    async fn handle(&self, event: &dyn Event) -> EventResult {
        match event.as_any().downcast_ref::<E>() {
            Some(event) => (self.callback)(event).await,
            None => EventResult::Continue,
        }
    }
}

#[derive(Default)]
struct HandlerTable {
    by_name: HashMap<&'static str, HandlerList>,
    by_type: HashMap<TypeId, HandlerList>,
    last_id: EventId,
}

impl HandlerTable {
    fn next_id(&mut self) -> EventId {
        self.last_id += 1;
        self.last_id
    }

    fn len(&self) -> usize {
        self.by_name.values().chain(self.by_type.values()).map(Vec::len).sum()
    }
}

async fn run_handlers(handlers: Option<&HandlerList>, event: &dyn Event) -> EventResult {
    for (id, handler) in handlers.into_iter().flatten() {
        if handler.handle(event).await == EventResult::Stop {
            trace!("Handler {} stopped '{}'", id, event.name());
            return EventResult::Stop;
        }
    }
    EventResult::Continue
}

/// Routes events to their subscribers.
///
/// Name subscribers run before type subscribers. Handlers must not register
/// or unregister handlers on the dispatcher that is calling them.
#[derive(Default)]
pub struct EventDispatcher {
    table: RwLock<HandlerTable>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.table.try_read().map(|table| table.len()).ok();
        f.debug_struct("EventDispatcher").field("handlers", &handlers).finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_handler(&self, event_name: &'static str, callback: NamedHandlerFn) -> EventId {
        let mut table = self.table.write().await;
        let id = table.next_id();
        table
            .by_name
            .entry(event_name)
            .or_default()
            .push((id, Box::new(NamedHandler { callback })));
        id
    }

    pub async fn register_type_handler<E: Event>(&self, callback: TypedHandlerFn<E>) -> EventId {
        let mut table = self.table.write().await;
        let id = table.next_id();
        table
            .by_type
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, Box::new(TypedHandler { callback })));
        id
    }

    pub async fn unregister_handler(&self, id: EventId) -> Result<(), EventSystemError> {
        let mut table = self.table.write().await;
        let HandlerTable { by_name, by_type, .. } = &mut *table;
        for handlers in by_name.values_mut().chain(by_type.values_mut()) {
            if let Some(pos) = handlers.iter().position(|(handler_id, _)| *handler_id == id) {
                handlers.remove(pos);
                return Ok(());
            }
        }
        Err(EventSystemError::HandlerNotFound { id })
    }

    pub async fn dispatch(&self, event: &dyn Event) -> EventResult {
        let table = self.table.read().await;
        trace!("Dispatching '{}'", event.name());
        if run_handlers(table.by_name.get(event.name()), event).await == EventResult::Stop {
            return EventResult::Stop;
        }
        run_handlers(table.by_type.get(&event.as_any().type_id()), event).await
    }

    pub async fn handler_count(&self) -> usize {
        self.table.read().await.len()
    }
}

/// Wrap a synchronous callback for [`EventDispatcher::register_handler`]
pub fn sync_event_handler<F>(f: F) -> NamedHandlerFn
where
    F: Fn(&dyn Event) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}

/// Wrap a synchronous callback for [`EventDispatcher::register_type_handler`]
pub fn sync_typed_handler<E, F>(f: F) -> TypedHandlerFn<E>
where
    E: Event,
    F: Fn(&E) -> EventResult + Send + Sync + 'static,
{
    Box::new(move |event| {
        let result = f(event);
        Box::pin(async move { result })
    })
}
