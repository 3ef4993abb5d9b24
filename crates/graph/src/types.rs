//! Wire types exchanged with the external commerce graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::{OrderId, OrderLineId, VariantId, WarehouseId};

use crate::error::MutationError;

/// An order as returned by the graph's read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// External order id.
    pub id: OrderId,
    /// The lines the graph assigned when building the order.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Returns the line matching the given variant, if any.
    pub fn line_for_variant(&self, variant_id: &VariantId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| &line.variant_id == variant_id)
    }
}

/// One line within an order.
///
/// The line id is assigned by the graph and is not known until the order
/// exists and has been queried; it is distinct from the variant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// External order-line id.
    pub id: OrderLineId,
    /// The product variant this line was built from.
    pub variant_id: VariantId,
    /// Units ordered on this line.
    pub quantity: u32,
}

/// A stock allocation within a fulfillment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAllocation {
    /// Units to fulfill from this warehouse.
    pub quantity: u32,
    /// The warehouse to fulfill from.
    pub warehouse_id: WarehouseId,
}

/// One line of a fulfillment request, built fresh per attempt from the
/// resolved variant-to-line mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentLine {
    /// The order line being fulfilled.
    pub order_line_id: OrderLineId,
    /// Stock allocations covering the line quantity.
    pub stocks: Vec<StockAllocation>,
}

/// Input to the graph's "fulfill order" mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    /// The order to fulfill.
    pub order_id: OrderId,
    /// The lines to fulfill.
    pub lines: Vec<FulfillmentLine>,
    /// Whether the graph should notify the customer.
    pub notify_customer: bool,
    /// Whether fulfillment may exceed recorded stock.
    pub allow_stock_to_be_exceeded: bool,
    /// Client-generated token identifying one fulfillment intent. Stable
    /// across retries of that intent so a duplicate submission after a lost
    /// response can be deduplicated upstream.
    pub idempotency_key: Uuid,
}

/// A fulfillment record created by the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    /// External fulfillment id.
    pub id: String,
    /// Fulfillment status as reported by the graph.
    pub status: String,
}

/// Payload of the "fulfill order" mutation: created fulfillments plus any
/// structured per-field errors. A non-empty error list means the mutation
/// did not take effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentPayload {
    /// Fulfillments created by this call.
    pub fulfillments: Vec<Fulfillment>,
    /// Structured errors; empty on success.
    pub errors: Vec<MutationError>,
}

impl FulfillmentPayload {
    /// A successful payload carrying the given fulfillments.
    pub fn success(fulfillments: Vec<Fulfillment>) -> Self {
        Self {
            fulfillments,
            errors: Vec::new(),
        }
    }

    /// A failed payload carrying the given errors.
    pub fn failure(errors: Vec<MutationError>) -> Self {
        Self {
            fulfillments: Vec::new(),
            errors,
        }
    }

    /// Returns true if the mutation took effect.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Shipping address attached to a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city: String,
    pub country: String,
}
