use serde_json::Value;

use crate::api::types::EntityId;
use crate::core::world::World;
#[cfg(feature = "physics")]
use crate::core::physics::ContactEvent;

/// What a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Arbitrary game-defined message.
    Generic,
    /// Translated physics contact-begin/contact-end event.
    PhysicsContact,
}

/// Opaque message payload. The engine never interprets it.
#[derive(Debug, Clone)]
pub enum MessagePayload {
    Empty,
    /// Structured game data.
    Json(Value),
    /// The raw contact event, attached by the physics-event translation step.
    #[cfg(feature = "physics")]
    Contact(ContactEvent),
}

/// An addressed, timestamped event. Immutable once published; delivered
/// at most once, within the frame the bus is drained.
#[derive(Debug, Clone)]
pub struct Message {
    /// Sender entity.
    pub from: EntityId,
    /// Receiver entity.
    pub to: EntityId,
    /// Engine time (ms) at creation.
    pub at: u64,
    pub kind: MessageKind,
    pub payload: MessagePayload,
}

impl Message {
    /// Create a generic message with an empty payload.
    pub fn new(from: EntityId, to: EntityId, at: u64) -> Self {
        Self {
            from,
            to,
            at,
            kind: MessageKind::Generic,
            payload: MessagePayload::Empty,
        }
    }

    pub fn with_json(mut self, value: Value) -> Self {
        self.payload = MessagePayload::Json(value);
        self
    }

    /// Create a physics-contact message carrying the raw event.
    #[cfg(feature = "physics")]
    pub fn contact(from: EntityId, to: EntityId, at: u64, event: ContactEvent) -> Self {
        Self {
            from,
            to,
            at,
            kind: MessageKind::PhysicsContact,
            payload: MessagePayload::Contact(event),
        }
    }
}

/// FIFO queue of addressed messages, drained once per frame.
pub struct MessageBus {
    queue: Vec<Message>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            queue: Vec::with_capacity(64),
        }
    }

    /// Append a message to the queue. Delivery happens at the next drain.
    pub fn publish(&mut self, message: Message) {
        self.queue.push(message);
    }

    /// Number of queued, undelivered messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Dequeue the current batch and deliver each message into its
    /// receiver's inbox, preserving publish order. Returns the number of
    /// messages actually delivered.
    ///
    /// Receivers that no longer exist cause a silent drop — an entity may
    /// be destroyed between publish and delivery, which is not an error.
    /// Messages published while a batch is being delivered go into the
    /// next batch, so one call is always a bounded pass.
    pub fn drain_and_deliver(&mut self, world: &mut World) -> usize {
        let batch = std::mem::take(&mut self.queue);
        let mut delivered = 0;

        for message in batch {
            match world.get_mut(message.to) {
                Some(entity) => {
                    entity.inbox.push(message);
                    delivered += 1;
                }
                None => {
                    log::debug!(
                        "dropping message from {:?} to unknown entity {:?}",
                        message.from,
                        message.to
                    );
                }
            }
        }

        delivered
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;

    fn world_with(n: u32) -> (World, Vec<EntityId>) {
        let mut world = World::new();
        let mut ids = Vec::new();
        for _ in 0..n {
            let id = world.next_id();
            world.spawn(Entity::new(id));
            ids.push(id);
        }
        (world, ids)
    }

    #[test]
    fn delivery_preserves_publish_order() {
        let (mut world, ids) = world_with(2);
        let (a, b) = (ids[0], ids[1]);
        let mut bus = MessageBus::new();

        bus.publish(Message::new(a, b, 1).with_json(serde_json::json!(1)));
        bus.publish(Message::new(b, a, 2).with_json(serde_json::json!(2)));
        bus.publish(Message::new(a, b, 3).with_json(serde_json::json!(3)));

        let delivered = bus.drain_and_deliver(&mut world);
        assert_eq!(delivered, 3);
        assert!(bus.is_empty());

        let inbox_b = &world.get(b).unwrap().inbox;
        assert_eq!(inbox_b.len(), 2);
        assert_eq!(inbox_b[0].at, 1);
        assert_eq!(inbox_b[1].at, 3);

        let inbox_a = &world.get(a).unwrap().inbox;
        assert_eq!(inbox_a.len(), 1);
        assert_eq!(inbox_a[0].at, 2);
    }

    #[test]
    fn unknown_receiver_is_dropped_silently() {
        let (mut world, ids) = world_with(1);
        let a = ids[0];
        let mut bus = MessageBus::new();

        bus.publish(Message::new(a, EntityId(9999), 1));
        bus.publish(Message::new(a, a, 2));

        let delivered = bus.drain_and_deliver(&mut world);
        assert_eq!(delivered, 1);
        assert_eq!(world.get(a).unwrap().inbox.len(), 1);
    }

    #[test]
    fn drain_is_a_single_batch() {
        let (mut world, ids) = world_with(1);
        let a = ids[0];
        let mut bus = MessageBus::new();

        bus.publish(Message::new(a, a, 1));
        bus.drain_and_deliver(&mut world);

        // A message published after the drain waits for the next one.
        bus.publish(Message::new(a, a, 2));
        assert_eq!(bus.len(), 1);
        assert_eq!(world.get(a).unwrap().inbox.len(), 1);
    }
}
