use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{DeliveryId, DomainError, DomainResult, Entity, OrderId};
use orderflow_orders::{ChangeStatus, Order, OrderStatus};

use crate::tracking::TrackingCode;

/// Delivery status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    AwaitingShipment,
    InTransit,
    Delivered,
}

impl DeliveryStatus {
    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::AwaitingShipment => "Awaiting shipment",
            DeliveryStatus::InTransit => "In transit",
            DeliveryStatus::Delivered => "Delivered",
        }
    }
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Shipment of one paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    order_id: OrderId,
    status: DeliveryStatus,
    tracking_code: TrackingCode,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(id: DeliveryId, order_id: OrderId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_id,
            status: DeliveryStatus::AwaitingShipment,
            tracking_code: TrackingCode::generate(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_typed(&self) -> DeliveryId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn tracking_code(&self) -> &TrackingCode {
        &self.tracking_code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Hand the order over to transport.
    ///
    /// Requires the order to be `Paid`. Returns the request moving the order to
    /// `Shipped`. A second start fails because the order has already moved on.
    pub fn start(&mut self, order: &Order, now: DateTime<Utc>) -> DomainResult<ChangeStatus> {
        self.ensure_order(order)?;

        if order.status() != OrderStatus::Paid {
            return Err(DomainError::precondition(format!(
                "cannot start delivery of an order that is not paid (status: {})",
                order.status()
            )));
        }

        self.status = DeliveryStatus::InTransit;
        self.updated_at = now;

        Ok(ChangeStatus {
            order_id: self.order_id,
            status: OrderStatus::Shipped,
            occurred_at: now,
        })
    }

    /// Complete the delivery.
    ///
    /// Requires this delivery to be `InTransit`. Returns the request moving the
    /// order to `Delivered`.
    pub fn finish(&mut self, order: &Order, now: DateTime<Utc>) -> DomainResult<ChangeStatus> {
        self.ensure_order(order)?;

        if self.status != DeliveryStatus::InTransit {
            return Err(DomainError::precondition(format!(
                "cannot finish a delivery that is not in transit (status: {})",
                self.status
            )));
        }

        self.status = DeliveryStatus::Delivered;
        self.updated_at = now;

        Ok(ChangeStatus {
            order_id: self.order_id,
            status: OrderStatus::Delivered,
            occurred_at: now,
        })
    }

    fn ensure_order(&self, order: &Order) -> Result<(), DomainError> {
        if order.id_typed() != self.order_id {
            return Err(DomainError::invariant("delivery driven with another order"));
        }
        Ok(())
    }
}

impl Entity for Delivery {
    type Id = DeliveryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Delivery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Delivery(code={}, status={})", self.tracking_code, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use orderflow_core::CustomerId;
    use orderflow_customers::Customer;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn order_in(status: OrderStatus) -> Order {
        let mut customer = Customer::new(CustomerId::new(), "João Silva", "Rua das Flores, 123");
        let (mut order, _) = Order::place(OrderId::new(), &mut customer, test_time()).unwrap();
        let mut current = order.status();
        while current != status {
            let next = current.next().unwrap();
            order.update_status(next, test_time()).unwrap();
            current = next;
        }
        order
    }

    #[test]
    fn new_delivery_awaits_shipment() {
        let now = test_time();
        let delivery = Delivery::new(DeliveryId::new(), OrderId::new(), now);

        assert_eq!(delivery.status(), DeliveryStatus::AwaitingShipment);
        assert_eq!(delivery.created_at(), now);
        assert_eq!(delivery.updated_at(), now);
        assert_eq!(delivery.tracking_code().as_str().len(), TrackingCode::LEN);
    }

    #[test]
    fn start_requires_paid_order() {
        for status in [
            OrderStatus::AwaitingPayment,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let order = order_in(status);
            let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), test_time());

            let err = delivery.start(&order, test_time()).unwrap_err();

            match err {
                DomainError::PreconditionViolation(msg) if msg.contains("not paid") => {}
                _ => panic!("Expected PreconditionViolation for order status {status}"),
            }
            assert_eq!(delivery.status(), DeliveryStatus::AwaitingShipment);
        }
    }

    #[test]
    fn start_moves_to_in_transit_and_requests_shipped() {
        let order = order_in(OrderStatus::Paid);
        let created = test_time();
        let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), created);
        let later = created + Duration::minutes(5);

        let transition = delivery.start(&order, later).unwrap();

        assert_eq!(transition.status, OrderStatus::Shipped);
        assert_eq!(transition.order_id, order.id_typed());
        assert_eq!(delivery.status(), DeliveryStatus::InTransit);
        assert_eq!(delivery.updated_at(), later);
        assert_eq!(delivery.created_at(), created);
    }

    #[test]
    fn finish_requires_in_transit() {
        let order = order_in(OrderStatus::Paid);
        let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), test_time());

        let err = delivery.finish(&order, test_time()).unwrap_err();

        match err {
            DomainError::PreconditionViolation(msg) if msg.contains("not in transit") => {}
            _ => panic!("Expected PreconditionViolation for finishing before start"),
        }
        assert_eq!(delivery.status(), DeliveryStatus::AwaitingShipment);
    }

    #[test]
    fn full_lifecycle_keeps_tracking_code() {
        let mut order = order_in(OrderStatus::Paid);
        let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), test_time());
        let code = delivery.tracking_code().clone();

        let shipped = delivery.start(&order, test_time()).unwrap();
        order.update_status(shipped.status, shipped.occurred_at).unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);

        let delivered = delivery.finish(&order, test_time()).unwrap();
        order
            .update_status(delivered.status, delivered.occurred_at)
            .unwrap();

        assert_eq!(delivery.status(), DeliveryStatus::Delivered);
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(delivery.tracking_code(), &code);

        // Terminal: neither transition is available any more.
        assert!(delivery.finish(&order, test_time()).is_err());
        assert!(delivery.start(&order, test_time()).is_err());
    }

    #[test]
    fn second_start_is_blocked_by_order_status() {
        let mut order = order_in(OrderStatus::Paid);
        let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), test_time());

        let shipped = delivery.start(&order, test_time()).unwrap();
        order.update_status(shipped.status, shipped.occurred_at).unwrap();

        let err = delivery.start(&order, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::PreconditionViolation(_)));
    }

    #[test]
    fn driving_with_another_order_is_rejected() {
        let order = order_in(OrderStatus::Paid);
        let mut delivery = Delivery::new(DeliveryId::new(), OrderId::new(), test_time());

        let err = delivery.start(&order, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn display_mentions_code_and_status() {
        let mut order = order_in(OrderStatus::Paid);
        let mut delivery = Delivery::new(DeliveryId::new(), order.id_typed(), test_time());
        let code = delivery.tracking_code().clone();

        assert_eq!(
            delivery.to_string(),
            format!("Delivery(code={code}, status=Awaiting shipment)")
        );

        let shipped = delivery.start(&order, test_time()).unwrap();
        order.update_status(shipped.status, shipped.occurred_at).unwrap();

        assert_eq!(
            delivery.to_string(),
            format!("Delivery(code={code}, status=In transit)")
        );
    }

    #[test]
    fn codes_differ_between_deliveries() {
        let order_id = OrderId::new();
        let a = Delivery::new(DeliveryId::new(), order_id, test_time());
        let b = Delivery::new(DeliveryId::new(), order_id, test_time());
        assert_ne!(a.tracking_code(), b.tracking_code());
    }
}
