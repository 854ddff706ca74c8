use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{
    Aggregate, AggregateRoot, CustomerId, DomainError, DomainResult, Money, OrderId, ProductId,
};
use orderflow_customers::Customer;
use orderflow_events::Event;
use orderflow_products::Product;

/// Order status lifecycle.
///
/// Strictly linear: `AwaitingPayment → Paid → Shipped → Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    AwaitingPayment,
    Paid,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// The only status this one may advance to.
    pub fn next(self) -> Option<Self> {
        match self {
            OrderStatus::AwaitingPayment => Some(OrderStatus::Paid),
            OrderStatus::Paid => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Whether the lifecycle has got as far as `status` (inclusive).
    pub fn has_reached(self, status: OrderStatus) -> bool {
        self.rank() >= status.rank()
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::AwaitingPayment => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
        }
    }

    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::AwaitingPayment => "Awaiting payment",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Order line: one product and how many units of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    product: Product,
    /// Always positive.
    quantity: i64,
}

impl OrderLine {
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn subtotal(&self) -> Money {
        self.product.price().times(self.quantity)
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    customer_id: Option<CustomerId>,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    created_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-placed aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            customer_id: None,
            status: OrderStatus::AwaitingPayment,
            lines: Vec::new(),
            created_at: None,
            version: 0,
            created: false,
        }
    }

    /// Rebuild an order from its recorded events.
    pub fn rehydrate<'a>(id: OrderId, events: impl IntoIterator<Item = &'a OrderEvent>) -> Self {
        let mut order = Self::empty(id);
        for event in events {
            order.apply(event);
        }
        order
    }

    /// Place a new order for `customer`, registering it in the customer's history.
    ///
    /// Both sides change in this one call; the history append is idempotent.
    pub fn place(
        order_id: OrderId,
        customer: &mut Customer,
        placed_at: DateTime<Utc>,
    ) -> DomainResult<(Self, Vec<OrderEvent>)> {
        let mut order = Self::empty(order_id);
        let events = order.execute(&OrderCommand::PlaceOrder(PlaceOrder {
            order_id,
            customer_id: customer.id_typed(),
            occurred_at: placed_at,
        }))?;
        customer.add_order(order_id);
        Ok((order, events))
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn line_for(&self, product_id: ProductId) -> Option<&OrderLine> {
        self.lines
            .iter()
            .find(|line| line.product.id_typed() == product_id)
    }

    /// Sum of all line subtotals (zero for an order without lines).
    ///
    /// `add_product` rejects any line that would make this overflow.
    pub fn calculate_total(&self) -> Money {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Add `quantity` units of `product`, merging into an existing line for the
    /// same product.
    pub fn add_product(
        &mut self,
        product: &Product,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<OrderEvent>> {
        self.execute(&OrderCommand::AddProduct(AddProduct {
            order_id: self.id,
            product: product.clone(),
            quantity,
            occurred_at,
        }))
    }

    /// Move the order to `status`. Only the next status in the lifecycle is
    /// accepted; asking for the current status is a no-op.
    pub fn update_status(
        &mut self,
        status: OrderStatus,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<OrderEvent>> {
        self.execute(&OrderCommand::ChangeStatus(ChangeStatus {
            order_id: self.id,
            status,
            occurred_at,
        }))
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl core::fmt::Display for Order {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Order(id={}, customer=", self.id)?;
        match self.customer_id {
            Some(customer_id) => write!(f, "{customer_id}")?,
            None => f.write_str("-")?,
        }
        write!(f, ", total={})", self.calculate_total())
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub order_id: OrderId,
    pub product: Product,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
///
/// This is what payments and deliveries hand back when they want the order to
/// move; they never touch the order's status themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    AddProduct(AddProduct),
    ChangeStatus(ChangeStatus),
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub order_id: OrderId,
    pub line_no: u32,
    pub product: Product,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineQuantityIncreased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineQuantityIncreased {
    pub order_id: OrderId,
    pub line_no: u32,
    pub product_id: ProductId,
    pub added: i64,
    /// Line quantity after the increase.
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    LineAdded(LineAdded),
    LineQuantityIncreased(LineQuantityIncreased),
    StatusChanged(StatusChanged),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::LineAdded(_) => "orders.order.line_added",
            OrderEvent::LineQuantityIncreased(_) => "orders.order.line_quantity_increased",
            OrderEvent::StatusChanged(_) => "orders.order.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::LineAdded(e) => e.occurred_at,
            OrderEvent::LineQuantityIncreased(e) => e.occurred_at,
            OrderEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.customer_id = Some(e.customer_id);
                self.status = OrderStatus::AwaitingPayment;
                self.lines.clear();
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::LineAdded(e) => {
                self.lines.push(OrderLine {
                    product: e.product.clone(),
                    quantity: e.quantity,
                });
            }
            OrderEvent::LineQuantityIncreased(e) => {
                if let Some(line) = self
                    .lines
                    .iter_mut()
                    .find(|line| line.product.id_typed() == e.product_id)
                {
                    line.quantity = e.quantity;
                }
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::AddProduct(cmd) => self.handle_add_product(cmd),
            OrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
        }
    }
}

impl Order {
    fn ensure_order_id(&self, order_id: OrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already exists"));
        }

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            customer_id: cmd.customer_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_product(&self, cmd: &AddProduct) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }

        let product_id = cmd.product.id_typed();
        let existing = self
            .lines
            .iter()
            .position(|line| line.product.id_typed() == product_id);

        let quantity = match existing {
            Some(idx) => self.lines[idx]
                .quantity
                .checked_add(cmd.quantity)
                .ok_or_else(|| DomainError::invalid_argument("quantity overflow"))?,
            None => cmd.quantity,
        };
        self.ensure_total_fits(&cmd.product, quantity)?;

        if let Some(idx) = existing {
            return Ok(vec![OrderEvent::LineQuantityIncreased(LineQuantityIncreased {
                order_id: cmd.order_id,
                line_no: (idx as u32) + 1,
                product_id,
                added: cmd.quantity,
                quantity,
                occurred_at: cmd.occurred_at,
            })]);
        }

        let next_line_no = (self.lines.len() as u32) + 1;

        Ok(vec![OrderEvent::LineAdded(LineAdded {
            order_id: cmd.order_id,
            line_no: next_line_no,
            product: cmd.product.clone(),
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// The total with `product` at `quantity` must stay representable, so
    /// `calculate_total` never has to clamp.
    fn ensure_total_fits(&self, product: &Product, quantity: i64) -> Result<(), DomainError> {
        let overflow = || DomainError::invalid_argument("order total overflow");
        let product_id = product.id_typed();
        let subtotal = product.price().checked_times(quantity).ok_or_else(overflow)?;

        self.lines
            .iter()
            .filter(|line| line.product.id_typed() != product_id)
            .try_fold(subtotal, |total, line| total.checked_add(line.subtotal()))
            .map(|_| ())
            .ok_or_else(overflow)
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<OrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;

        if cmd.status == self.status {
            return Ok(vec![]);
        }

        if !self.status.can_transition_to(cmd.status) {
            return Err(DomainError::invalid_transition(format!(
                "order cannot move from {} to {}",
                self.status, cmd.status
            )));
        }

        Ok(vec![OrderEvent::StatusChanged(StatusChanged {
            order_id: cmd.order_id,
            from: self.status,
            to: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }
}
