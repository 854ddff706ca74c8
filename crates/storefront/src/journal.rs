use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use orderflow_core::{AggregateId, AggregateRoot, OrderId};
use orderflow_events::{Event, EventEnvelope};
use orderflow_orders::{Order, OrderEvent};

pub const ORDER_AGGREGATE_TYPE: &str = "orders.order";

/// Append-only record of every event applied to each order.
#[derive(Debug, Default)]
pub struct OrderJournal {
    streams: HashMap<OrderId, Vec<EventEnvelope<OrderEvent>>>,
}

impl OrderJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `events`, which must already have been applied to `order`.
    ///
    /// Sequence numbers are derived from the order version, so the last recorded
    /// envelope always carries `order.version()`.
    pub fn record(&mut self, order: &Order, events: Vec<OrderEvent>) {
        if events.is_empty() {
            return;
        }

        let order_id = order.id_typed();
        let aggregate_id = AggregateId::from_uuid(*order_id.as_uuid());
        let first_sequence = order.version() + 1 - events.len() as u64;
        let stream = self.streams.entry(order_id).or_default();

        for (offset, event) in events.into_iter().enumerate() {
            let sequence_number = first_sequence + offset as u64;
            debug!(
                order_id = %order_id,
                event_type = event.event_type(),
                sequence_number,
                payload = %serde_json::to_value(&event).unwrap_or(JsonValue::Null),
                "order event recorded"
            );
            stream.push(EventEnvelope::new(
                Uuid::now_v7(),
                aggregate_id,
                ORDER_AGGREGATE_TYPE,
                sequence_number,
                event,
            ));
        }
    }

    /// Events of one order in the order they were applied.
    pub fn stream(&self, order_id: OrderId) -> &[EventEnvelope<OrderEvent>] {
        self.streams
            .get(&order_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rebuild an order from its recorded stream.
    pub fn replay(&self, order_id: OrderId) -> Order {
        Order::rehydrate(order_id, self.stream(order_id).iter().map(EventEnvelope::payload))
    }
}
