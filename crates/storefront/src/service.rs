use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use orderflow_core::{
    Aggregate, CustomerId, DeliveryId, DomainError, DomainResult, Money, OrderId, PaymentId,
    ProductId,
};
use orderflow_customers::Customer;
use orderflow_events::EventEnvelope;
use orderflow_orders::{Order, OrderCommand, OrderEvent, OrderStatus};
use orderflow_payments::{Payment, PaymentMethod, PaymentOutcome};
use orderflow_products::Product;
use orderflow_shipping::Delivery;

use crate::journal::OrderJournal;
use crate::store::InMemoryStore;

/// One row of a customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub total: Money,
    pub status: OrderStatus,
}

/// Order-to-delivery workflow over in-memory stores.
///
/// Payments and deliveries never write to an order. They return the status
/// change they want, and the storefront applies it to the single stored order
/// before committing the collaborator's own new state. If the order rejects the
/// change, neither side moves.
#[derive(Debug, Default)]
pub struct Storefront {
    products: InMemoryStore<ProductId, Product>,
    customers: InMemoryStore<CustomerId, Customer>,
    orders: InMemoryStore<OrderId, Order>,
    payments: InMemoryStore<PaymentId, Payment>,
    deliveries: InMemoryStore<DeliveryId, Delivery>,
    journal: OrderJournal,
}

impl Storefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, name: impl Into<String>, price: Money) -> DomainResult<ProductId> {
        let product = Product::new(ProductId::new(), name, price);
        let product_id = product.id_typed();
        info!(%product_id, name = product.name(), %price, "product added to catalog");
        self.products.insert(product_id, product)?;
        Ok(product_id)
    }

    pub fn register_customer(
        &mut self,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> DomainResult<CustomerId> {
        let customer = Customer::new(CustomerId::new(), name, address);
        let customer_id = customer.id_typed();
        info!(%customer_id, name = customer.name(), "customer registered");
        self.customers.insert(customer_id, customer)?;
        Ok(customer_id)
    }

    /// Place an empty order and append it to the customer's history.
    pub fn place_order(&mut self, customer_id: CustomerId) -> DomainResult<OrderId> {
        let order_id = OrderId::new();
        if self.orders.contains(&order_id) {
            return Err(DomainError::conflict(format!("order {order_id} already exists")));
        }

        let customer = self.customers.require_mut(&customer_id)?;
        let (order, events) = Order::place(order_id, customer, Utc::now())?;

        info!(%order_id, %customer_id, "order placed");
        self.journal.record(&order, events);
        self.orders.insert(order_id, order)?;
        Ok(order_id)
    }

    pub fn add_to_order(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<()> {
        let product = self.products.require(&product_id)?;
        let order = self.orders.require_mut(&order_id)?;

        let events = match order.add_product(product, quantity, Utc::now()) {
            Ok(events) => events,
            Err(err) => {
                warn!(%order_id, %product_id, quantity, error = %err, "product rejected");
                return Err(err);
            }
        };

        info!(
            %order_id,
            %product_id,
            quantity,
            total = %order.calculate_total(),
            "product added to order"
        );
        self.journal.record(order, events);
        Ok(())
    }

    pub fn order_total(&self, order_id: OrderId) -> DomainResult<Money> {
        Ok(self.orders.require(&order_id)?.calculate_total())
    }

    pub fn create_payment(
        &mut self,
        order_id: OrderId,
        method: PaymentMethod,
    ) -> DomainResult<PaymentId> {
        if !self.orders.contains(&order_id) {
            return Err(DomainError::not_found());
        }

        let payment = Payment::new(PaymentId::new(), order_id, method);
        let payment_id = payment.id_typed();
        info!(%payment_id, %order_id, %method, "payment created");
        self.payments.insert(payment_id, payment)?;
        Ok(payment_id)
    }

    /// Run the simulated processor. A decline is `Ok(false)`, not an error.
    ///
    /// Processing again is allowed and decides afresh from the current total.
    /// An approval only moves an order that has not reached `Paid` yet; for an
    /// order already paid, shipped or delivered it returns `Ok(true)` and leaves
    /// the order where it is.
    pub fn process_payment(&mut self, payment_id: PaymentId) -> DomainResult<bool> {
        let payment = self.payments.require_mut(&payment_id)?;
        let order_id = payment.order_id();
        let order = self.orders.require_mut(&order_id)?;

        let mut attempt = payment.clone();
        let outcome = attempt.process(order, Utc::now())?;

        match &outcome {
            PaymentOutcome::Approved { transition }
                if order.status().has_reached(transition.status) =>
            {
                info!(
                    %payment_id,
                    %order_id,
                    order_status = %order.status(),
                    "payment approved, order already paid"
                );
            }
            PaymentOutcome::Approved { transition } => {
                let events = order.execute(&OrderCommand::ChangeStatus(transition.clone()))?;
                info!(%payment_id, %order_id, total = %order.calculate_total(), "payment approved");
                self.journal.record(order, events);
            }
            PaymentOutcome::Recused { total } => {
                warn!(%payment_id, %order_id, %total, "payment recused");
            }
        }

        *payment = attempt;
        Ok(outcome.is_approved())
    }

    /// Create a delivery for an existing order. Whether the order may ship is
    /// checked when the delivery starts.
    pub fn create_delivery(&mut self, order_id: OrderId) -> DomainResult<DeliveryId> {
        if !self.orders.contains(&order_id) {
            return Err(DomainError::not_found());
        }

        let delivery = Delivery::new(DeliveryId::new(), order_id, Utc::now());
        let delivery_id = delivery.id_typed();
        info!(
            %delivery_id,
            %order_id,
            tracking_code = %delivery.tracking_code(),
            "delivery created"
        );
        self.deliveries.insert(delivery_id, delivery)?;
        Ok(delivery_id)
    }

    pub fn start_delivery(&mut self, delivery_id: DeliveryId) -> DomainResult<()> {
        self.advance_delivery(delivery_id, DeliveryStep::Start)
    }

    pub fn finish_delivery(&mut self, delivery_id: DeliveryId) -> DomainResult<()> {
        self.advance_delivery(delivery_id, DeliveryStep::Finish)
    }

    fn advance_delivery(&mut self, delivery_id: DeliveryId, step: DeliveryStep) -> DomainResult<()> {
        let delivery = self.deliveries.require_mut(&delivery_id)?;
        let order_id = delivery.order_id();
        let order = self.orders.require_mut(&order_id)?;

        let mut attempt = delivery.clone();
        let now = Utc::now();
        let requested = match step {
            DeliveryStep::Start => attempt.start(order, now),
            DeliveryStep::Finish => attempt.finish(order, now),
        };
        let transition = match requested {
            Ok(transition) => transition,
            Err(err) => {
                warn!(%delivery_id, %order_id, ?step, error = %err, "delivery step rejected");
                return Err(err);
            }
        };

        let events = order.execute(&OrderCommand::ChangeStatus(transition))?;
        info!(
            %delivery_id,
            %order_id,
            delivery_status = %attempt.status(),
            order_status = %order.status(),
            "delivery advanced"
        );
        self.journal.record(order, events);
        *delivery = attempt;
        Ok(())
    }

    /// The customer's orders, oldest first, with their current totals and statuses.
    pub fn customer_history(&self, customer_id: CustomerId) -> DomainResult<Vec<OrderSummary>> {
        let customer = self.customers.require(&customer_id)?;
        customer
            .order_history()
            .iter()
            .map(|order_id| {
                let order = self.orders.require(order_id)?;
                Ok(OrderSummary {
                    order_id: *order_id,
                    total: order.calculate_total(),
                    status: order.status(),
                })
            })
            .collect()
    }

    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.get(&product_id)
    }

    pub fn customer(&self, customer_id: CustomerId) -> Option<&Customer> {
        self.customers.get(&customer_id)
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn payment(&self, payment_id: PaymentId) -> Option<&Payment> {
        self.payments.get(&payment_id)
    }

    pub fn delivery(&self, delivery_id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.get(&delivery_id)
    }

    pub fn journal(&self, order_id: OrderId) -> &[EventEnvelope<OrderEvent>] {
        self.journal.stream(order_id)
    }

    pub fn replay_order(&self, order_id: OrderId) -> Order {
        self.journal.replay(order_id)
    }
}

#[derive(Debug, Clone, Copy)]
enum DeliveryStep {
    Start,
    Finish,
}
