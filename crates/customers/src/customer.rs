use serde::{Deserialize, Serialize};

use orderflow_core::{CustomerId, Entity, OrderId};

/// Customer identity plus order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    address: String,
    order_history: Vec<OrderId>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            order_history: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Orders in the sequence they were placed.
    pub fn order_history(&self) -> &[OrderId] {
        &self.order_history
    }

    pub fn has_order(&self, order_id: OrderId) -> bool {
        self.order_history.contains(&order_id)
    }

    /// Record an order in the history.
    ///
    /// Idempotent: returns `false` and leaves the history untouched when the
    /// order is already present.
    pub fn add_order(&mut self, order_id: OrderId) -> bool {
        if self.has_order(order_id) {
            return false;
        }
        self.order_history.push(order_id);
        true
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Customer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Customer(id={}, name={})", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_customer() -> Customer {
        Customer::new(CustomerId::new(), "João Silva", "Rua das Flores, 123")
    }

    #[test]
    fn new_customer_has_empty_history() {
        let customer = test_customer();
        assert_eq!(customer.name(), "João Silva");
        assert_eq!(customer.address(), "Rua das Flores, 123");
        assert!(customer.order_history().is_empty());
    }

    #[test]
    fn add_order_appends_in_creation_order() {
        let mut customer = test_customer();
        let first = OrderId::new();
        let second = OrderId::new();

        assert!(customer.add_order(first));
        assert!(customer.add_order(second));

        assert_eq!(customer.order_history(), &[first, second]);
    }

    #[test]
    fn add_order_is_idempotent() {
        let mut customer = test_customer();
        let order_id = OrderId::new();

        assert!(customer.add_order(order_id));
        assert!(!customer.add_order(order_id));

        assert_eq!(customer.order_history(), &[order_id]);
        assert!(customer.has_order(order_id));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any sequence of add_order calls (with repeats) keeps each id
            /// exactly once, at the position of its first insertion.
            #[test]
            fn history_has_no_duplicates(picks in proptest::collection::vec(0usize..5, 0..40)) {
                let ids: Vec<OrderId> = (0..5).map(|_| OrderId::new()).collect();
                let mut customer = test_customer();
                let mut expected: Vec<OrderId> = Vec::new();

                for pick in picks {
                    let id = ids[pick];
                    customer.add_order(id);
                    if !expected.contains(&id) {
                        expected.push(id);
                    }
                }

                prop_assert_eq!(customer.order_history(), expected.as_slice());
            }
        }
    }
}
