//! Opaque external identifier newtypes.
//!
//! Each wraps the string id assigned by the external commerce graph.
//! They are plain values: comparable, hashable, displayable, nothing more.

use serde::{Deserialize, Serialize};

macro_rules! external_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

external_id! {
    /// Product-variant identifier: the catalog id for a purchasable SKU,
    /// known before any order exists.
    VariantId
}

external_id! {
    /// Identifier of a checkout aggregate in the external graph.
    CheckoutId
}

external_id! {
    /// Identifier of an order in the external graph. Orders are eventually
    /// consistent for reads: a freshly created id may not be visible yet.
    OrderId
}

external_id! {
    /// Identifier of a single line within an order. Assigned by the graph
    /// when it builds the order; distinct from the variant id.
    OrderLineId
}

external_id! {
    /// Identifier of a warehouse stock is fulfilled from.
    WarehouseId
}

external_id! {
    /// Identifier of a delivery method attached to a checkout.
    DeliveryMethodId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(OrderId::new("order_123"), OrderId::from("order_123"));
        assert_ne!(OrderId::new("order_123"), OrderId::new("order_456"));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = VariantId::new("v1");
        assert_eq!(id.to_string(), "v1");
        assert_eq!(id.as_str(), "v1");
    }

    #[test]
    fn id_serializes_transparently() {
        let id = OrderLineId::new("line_abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"line_abc\"");
        let back: OrderLineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
