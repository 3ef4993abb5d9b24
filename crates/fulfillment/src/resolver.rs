//! Order line resolver.
//!
//! Fulfillment requests must reference the line ids the graph assigned when
//! it built the order, not the variant ids the cart knows. The mapping has
//! to be re-established per order, and only after the order is confirmed to
//! exist; reading earlier races the write.

use std::collections::HashMap;

use common::{CartItem, OrderId, OrderLineId, VariantId, WarehouseId};
use graph::{CommerceGraph, FulfillmentLine, StockAllocation};

use crate::error::{FulfillmentError, Result};

/// Translates cart variant ids into the order's line ids.
pub struct OrderLineResolver<G> {
    graph: G,
}

impl<G: CommerceGraph> OrderLineResolver<G> {
    /// Creates a resolver over the given graph.
    pub fn new(graph: G) -> Self {
        Self { graph }
    }

    /// Returns the line id the order assigned to a single variant.
    ///
    /// Precondition: the order's existence has been confirmed.
    pub async fn line_id_for_variant(
        &self,
        order_id: &OrderId,
        variant_id: &VariantId,
    ) -> Result<OrderLineId> {
        let order = self
            .graph
            .get_order(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNeverVisible(order_id.clone()))?;

        order
            .line_for_variant(variant_id)
            .map(|line| line.id.clone())
            .ok_or_else(|| FulfillmentError::LineMappingNotFound {
                order_id: order_id.clone(),
                variant_id: variant_id.clone(),
            })
    }

    /// Resolves every cart item into a fulfillment line in one read.
    ///
    /// Fails fast: if any variant has no matching line, the whole batch
    /// fails and no fulfillment attempt should be made. Each resolved line
    /// allocates the full item quantity from the given warehouse.
    pub async fn resolve_lines(
        &self,
        order_id: &OrderId,
        items: &[CartItem],
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<FulfillmentLine>> {
        let order = self
            .graph
            .get_order(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNeverVisible(order_id.clone()))?;

        let by_variant: HashMap<&VariantId, &OrderLineId> = order
            .lines
            .iter()
            .map(|line| (&line.variant_id, &line.id))
            .collect();

        items
            .iter()
            .map(|item| {
                let line_id = by_variant.get(&item.variant_id).ok_or_else(|| {
                    FulfillmentError::LineMappingNotFound {
                        order_id: order_id.clone(),
                        variant_id: item.variant_id.clone(),
                    }
                })?;
                Ok(FulfillmentLine {
                    order_line_id: (*line_id).clone(),
                    stocks: vec![StockAllocation {
                        quantity: item.quantity,
                        warehouse_id: warehouse_id.clone(),
                    }],
                })
            })
            .collect()
    }
}
