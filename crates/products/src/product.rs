use serde::{Deserialize, Serialize};

use orderflow_core::{Entity, Money, ProductId};

/// Immutable catalog entry.
///
/// There are no setters: the price an order line sees is the price the product
/// was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price in smallest currency unit.
    pub fn price(&self) -> Money {
        self.price
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Product(id={}, name={}, price={})", self.id, self.name, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_name_and_price() {
        let id = ProductId::new();
        let product = Product::new(id, "Notebook", Money::from_units(2500));

        assert_eq!(product.id(), &id);
        assert_eq!(product.id_typed(), id);
        assert_eq!(product.name(), "Notebook");
        assert_eq!(product.price(), Money::from_units(2500));
    }

    #[test]
    fn free_products_are_allowed() {
        let product = Product::new(ProductId::new(), "Sticker", Money::ZERO);
        assert!(product.price().is_zero());
    }

    #[test]
    fn display_mentions_price() {
        let product = Product::new(ProductId::new(), "Mouse", Money::from_units(50));
        assert!(product.to_string().contains("price=50.00"));
    }

    #[test]
    fn serializes_price_as_cents() {
        let product = Product::new(ProductId::new(), "Mouse", Money::from_cents(5_000));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 5_000);
        assert_eq!(json["name"], "Mouse");
    }
}
