//! Error taxonomy for the core runtime.
//!
//! Nothing here is fatal to the process. Lookup and lifecycle errors are
//! recovered locally (no-op or fallback) at the call site; system and
//! handler faults are caught at the world/bus boundary and logged. The
//! types exist so reports and logs can carry a structured cause instead
//! of a silent swallow.

use thiserror::Error;

use crate::ecs::EntityId;

/// A lookup that found nothing where something was expected.
///
/// Always recovered locally: callers fall back to a default or no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The entity id is not registered in the world.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// An explicit id collided with a live entity.
    #[error("entity id {0} is already registered")]
    DuplicateEntity(EntityId),

    /// A kind discriminator string matched no known effect kind.
    #[error("unknown effect kind {0:?}")]
    UnknownKind(String),
}

/// An operation on an object that is past (or outside) its lifecycle.
///
/// Always a safe no-op at the call site, never a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// A pool handle that is stale (double release) or foreign to the
    /// pool it was presented to.
    #[error("stale or foreign pool handle {index}:{generation}")]
    StaleHandle {
        /// Slot index the handle pointed at.
        index: u32,
        /// Generation the handle carried.
        generation: u32,
    },

    /// The entity was already destroyed.
    #[error("entity {0} is already destroyed")]
    EntityDestroyed(EntityId),
}

/// A fault raised by a system's `initialize` or `update`.
///
/// Caught at the [`World`](crate::World) boundary: logged with the
/// offending system named, then the frame continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SystemError {
    /// Human-readable cause.
    pub message: String,
}

impl SystemError {
    /// Creates a system fault with the given cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A fault raised by a message-bus handler during dispatch.
///
/// Caught per handler inside `publish`: recorded in the
/// [`PublishReport`](crate::events::PublishReport), logged, and the
/// remaining handlers still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler rejected the message.
    #[error("handler rejected message: {0}")]
    Rejected(String),

    /// The handler was re-entered while already dispatching, which a
    /// nested publish of the same topic can cause. The nested delivery
    /// to that handler is skipped.
    #[error("handler re-entered during its own dispatch")]
    Reentrant,
}
