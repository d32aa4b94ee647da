//! # Plinth Core Event System Errors
use crate::event::EventId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("No event handler registered with ID {id}")]
    HandlerNotFound { id: EventId },
}
