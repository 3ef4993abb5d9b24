//! Shared value types for the order fulfillment service.
//!
//! All identifiers handed out by the external commerce graph are opaque
//! strings; the newtypes here exist so they cannot be mixed up with each
//! other. Nothing in this crate parses or interprets them.

pub mod ids;
pub mod money;

pub use ids::{CheckoutId, DeliveryMethodId, OrderId, OrderLineId, VariantId, WarehouseId};
pub use money::Money;

use serde::{Deserialize, Serialize};

/// A single line of a cart as submitted by the caller.
///
/// Ephemeral: constructed per checkout attempt, never persisted by this
/// subsystem. The `variant_id` is the catalog identifier known before an
/// order exists; the order-line id it maps to is only known after the
/// external graph has built the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// External product-variant identifier for the purchasable SKU.
    pub variant_id: VariantId,
    /// Display name for the item.
    pub name: String,
    /// Units ordered; must be positive.
    pub quantity: u32,
    /// Unit price.
    pub price: Money,
}

impl CartItem {
    /// Creates a new cart item.
    pub fn new(
        variant_id: impl Into<VariantId>,
        name: impl Into<String>,
        quantity: u32,
        price: Money,
    ) -> Self {
        Self {
            variant_id: variant_id.into(),
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Returns the line total (unit price times quantity).
    pub fn total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_item_total() {
        let item = CartItem::new("v1", "Tusker Lager", 2, Money::from_cents(15000));
        assert_eq!(item.total(), Money::from_cents(30000));
    }

    #[test]
    fn cart_item_serialization_roundtrip() {
        let item = CartItem::new("v1", "Tusker Lager", 2, Money::from_cents(15000));
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: CartItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }
}
