//! # Message Bus
//!
//! Synchronous topic-based publish/subscribe used to decouple systems
//! from each other and from out-of-scope collaborators (audio, UI).
//! Topics are the only integration seam: the core never calls into a
//! collaborator directly, it only publishes payloads they choose to read.
//!
//! Dispatch is single-threaded and in subscription order. A handler
//! fault is captured into the [`PublishReport`] and logged; it never
//! stops the remaining handlers or the publishing system's frame. A
//! handler may itself publish: the nested publish runs depth-first to
//! completion before the outer publish resumes, because each publish
//! iterates over its own snapshot of the subscriber list.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use tracing::warn;

use crate::ecs::{EntityId, EntitySnapshot};
use crate::error::HandlerError;

/// Well-known topic names.
///
/// The payload schema per topic is part of the public contract; each
/// constant documents the payload variant it carries.
pub mod topics {
    /// An entity was removed from the world.
    /// Payload: [`Payload::EntityDestroyed`](super::Payload::EntityDestroyed).
    pub const ENTITY_DESTROYED: &str = "entity.destroyed";

    /// A weapon fired a projectile.
    /// Payload: [`Payload::ProjectileFired`](super::Payload::ProjectileFired).
    pub const PROJECTILE_FIRED: &str = "projectile.fired";

    /// A pooled visual effect went live.
    /// Payload: [`Payload::EffectSpawned`](super::Payload::EffectSpawned).
    pub const EFFECT_SPAWNED: &str = "effect.spawned";

    /// A pooled visual effect expired or was released early.
    /// Payload: [`Payload::EffectExpired`](super::Payload::EffectExpired).
    pub const EFFECT_EXPIRED: &str = "effect.expired";

    /// A ship entity was destroyed by combat.
    /// Payload: [`Payload::ShipDestroyed`](super::Payload::ShipDestroyed).
    pub const SHIP_DESTROYED: &str = "ship.destroyed";
}

/// Typed payload carried by a [`Message`].
///
/// A closed union instead of an untyped bag: subscribers match on the
/// variant they document for their topic.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// No data beyond the topic itself.
    None,
    /// Snapshot of an entity taken just before its destruction.
    EntityDestroyed(EntitySnapshot),
    /// A projectile left a weapon.
    ProjectileFired {
        /// Entity that fired.
        shooter: EntityId,
        /// Effect-kind vocabulary string (`"laser"`, `"missile"`, ...).
        kind: String,
        /// World-space origin.
        origin: [f32; 3],
        /// Normalized direction of travel.
        direction: [f32; 3],
    },
    /// A pooled effect went live.
    EffectSpawned {
        /// Effect-kind vocabulary string.
        kind: String,
        /// World-space position at spawn.
        position: [f32; 3],
    },
    /// A pooled effect was reclaimed.
    EffectExpired {
        /// Effect-kind vocabulary string.
        kind: String,
    },
    /// A ship was destroyed.
    ShipDestroyed {
        /// The destroyed entity.
        id: EntityId,
        /// Where it died, for audio/UI collaborators.
        position: [f32; 3],
    },
    /// Free-form text, for diagnostics topics.
    Text(String),
}

/// A published message. Immutable once published.
#[derive(Clone, Debug)]
pub struct Message {
    /// Topic the message was published on.
    pub topic: String,
    /// Typed payload.
    pub payload: Payload,
    /// Capture time of the publish call.
    pub timestamp: Instant,
}

/// Outcome of a single `publish` call: the formalized per-handler
/// result channel. Failures are also logged at the bus boundary.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Handlers that faulted, with their subscription ids and causes.
    pub failures: Vec<(u64, HandlerError)>,
}

impl PublishReport {
    /// True when every subscribed handler ran without fault.
    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Capability to remove exactly one subscription.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    id: u64,
}

impl Subscription {
    /// Topic this subscription listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Bus-unique subscription id (appears in fault logs).
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

type HandlerFn = dyn FnMut(&Message) -> Result<(), HandlerError>;

#[derive(Clone)]
struct Subscriber {
    id: u64,
    handler: Rc<RefCell<Box<HandlerFn>>>,
}

#[derive(Default)]
struct BusState {
    topics: HashMap<String, Vec<Subscriber>>,
    next_id: u64,
}

/// Synchronous publish/subscribe bus.
///
/// Interior-mutable so handlers holding an `Rc<MessageBus>` can publish
/// or subscribe from inside a dispatch. Single-threaded by contract.
#[derive(Default)]
pub struct MessageBus {
    state: RefCell<BusState>,
}

impl MessageBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to a topic, appended after any existing
    /// subscribers. Returns the capability to remove exactly this
    /// subscription.
    pub fn subscribe(
        &self,
        topic: &str,
        handler: impl FnMut(&Message) -> Result<(), HandlerError> + 'static,
    ) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber {
                id,
                handler: Rc::new(RefCell::new(Box::new(handler))),
            });
        Subscription {
            topic: topic.to_string(),
            id,
        }
    }

    /// Removes the subscription. Returns `false` if it was already
    /// removed (safe no-op).
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(subscribers) = state.topics.get_mut(&subscription.topic) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|s| s.id != subscription.id);
        before != subscribers.len()
    }

    /// Number of handlers currently subscribed to `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Publishes a message, synchronously invoking every handler
    /// subscribed to `topic` at call time, in subscription order.
    ///
    /// The subscriber list is snapshotted first: handlers added or
    /// removed during dispatch take effect from the next publish.
    /// Handler faults are logged and recorded in the report; later
    /// handlers still run. A handler re-entered by a nested publish of
    /// its own topic is skipped for the nested delivery and the skip is
    /// reported as [`HandlerError::Reentrant`].
    pub fn publish(&self, topic: &str, payload: Payload) -> PublishReport {
        let message = Message {
            topic: topic.to_string(),
            payload,
            timestamp: Instant::now(),
        };
        let snapshot: Vec<Subscriber> = self
            .state
            .borrow()
            .topics
            .get(topic)
            .cloned()
            .unwrap_or_default();

        let mut report = PublishReport::default();
        for subscriber in snapshot {
            let Ok(mut handler) = subscriber.handler.try_borrow_mut() else {
                warn!(
                    topic,
                    subscription = subscriber.id,
                    "handler re-entered by nested publish; skipping nested delivery"
                );
                report.failures.push((subscriber.id, HandlerError::Reentrant));
                continue;
            };
            match handler(&message) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(
                        topic,
                        subscription = subscriber.id,
                        error = %err,
                        "message handler failed; continuing with remaining handlers"
                    );
                    report.failures.push((subscriber.id, err));
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MessageBus")
            .field("topics", &state.topics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = MessageBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            bus.subscribe("test", move |_| {
                order.borrow_mut().push(tag);
                Ok(())
            });
        }
        let report = bus.publish("test", Payload::None);
        assert_eq!(report.delivered, 3);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failing_handler_does_not_stop_later_handlers() {
        let bus = MessageBus::new();
        let hits = Rc::new(RefCell::new(0u32));

        let h = Rc::clone(&hits);
        bus.subscribe("test", move |_| {
            *h.borrow_mut() += 1;
            Ok(())
        });
        bus.subscribe("test", |_| {
            Err(HandlerError::Rejected("bad payload".to_string()))
        });
        let h = Rc::clone(&hits);
        bus.subscribe("test", move |_| {
            *h.borrow_mut() += 1;
            Ok(())
        });

        let report = bus.publish("test", Payload::None);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(*hits.borrow(), 2);
        assert!(!report.all_delivered());
    }

    #[test]
    fn unsubscribe_removes_exactly_that_handler() {
        let bus = MessageBus::new();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let h = Rc::clone(&hits);
        let first = bus.subscribe("test", move |_| {
            h.borrow_mut().push("first");
            Ok(())
        });
        let h = Rc::clone(&hits);
        bus.subscribe("test", move |_| {
            h.borrow_mut().push("second");
            Ok(())
        });

        assert!(bus.unsubscribe(&first));
        assert!(!bus.unsubscribe(&first));
        bus.publish("test", Payload::None);
        assert_eq!(*hits.borrow(), vec!["second"]);
    }

    #[test]
    fn publish_sees_subscribers_at_call_time_only() {
        let bus = Rc::new(MessageBus::new());
        let hits = Rc::new(RefCell::new(0u32));

        let bus_inner = Rc::clone(&bus);
        let h = Rc::clone(&hits);
        bus.subscribe("test", move |_| {
            // Subscribing mid-dispatch must not affect this publish.
            let h = Rc::clone(&h);
            bus_inner.subscribe("test", move |_| {
                *h.borrow_mut() += 1;
                Ok(())
            });
            Ok(())
        });

        let report = bus.publish("test", Payload::None);
        assert_eq!(report.delivered, 1);
        assert_eq!(*hits.borrow(), 0);

        bus.publish("test", Payload::None);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn nested_publish_completes_depth_first() {
        let bus = Rc::new(MessageBus::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        bus.subscribe("inner", move |_| {
            o.borrow_mut().push("inner");
            Ok(())
        });

        let bus_inner = Rc::clone(&bus);
        let o = Rc::clone(&order);
        bus.subscribe("outer", move |_| {
            o.borrow_mut().push("outer-before");
            bus_inner.publish("inner", Payload::None);
            o.borrow_mut().push("outer-after");
            Ok(())
        });
        let o = Rc::clone(&order);
        bus.subscribe("outer", move |_| {
            o.borrow_mut().push("outer-second");
            Ok(())
        });

        bus.publish("outer", Payload::None);
        assert_eq!(
            *order.borrow(),
            vec!["outer-before", "inner", "outer-after", "outer-second"]
        );
    }

    #[test]
    fn reentrant_same_handler_is_skipped_not_deadlocked() {
        let bus = Rc::new(MessageBus::new());
        let depth = Rc::new(RefCell::new(0u32));

        let bus_inner = Rc::clone(&bus);
        let d = Rc::clone(&depth);
        bus.subscribe("loop", move |_| {
            *d.borrow_mut() += 1;
            // Publishing our own topic would recurse forever; the bus
            // skips the re-entered handler instead.
            let report = bus_inner.publish("loop", Payload::None);
            assert!(matches!(
                report.failures.as_slice(),
                [(_, HandlerError::Reentrant)]
            ));
            Ok(())
        });

        let report = bus.publish("loop", Payload::None);
        assert_eq!(report.delivered, 1);
        assert_eq!(*depth.borrow(), 1);
    }

    #[test]
    fn publish_with_no_subscribers_is_empty_report() {
        let bus = MessageBus::new();
        let report = bus.publish("nobody.home", Payload::None);
        assert_eq!(report.delivered, 0);
        assert!(report.all_delivered());
    }
}
