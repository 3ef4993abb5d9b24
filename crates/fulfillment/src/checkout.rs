//! Checkout coordinator.
//!
//! Drives a cart through the graph's checkout sequence: create, attach
//! address, attach delivery method, complete. Completion yields the order
//! id; the order itself may not be visible to reads yet, which is the
//! orchestrator's problem, not this one's.

use common::{CartItem, DeliveryMethodId, OrderId};
use graph::{Address, CommerceGraph};

use crate::error::{FulfillmentError, Result};

/// Turns a cart into a placed order via the graph's checkout mutations.
pub struct CheckoutCoordinator<G> {
    graph: G,
}

impl<G: CommerceGraph> CheckoutCoordinator<G> {
    /// Creates a coordinator over the given graph.
    pub fn new(graph: G) -> Self {
        Self { graph }
    }

    /// Places an order for the given cart.
    ///
    /// Steps run strictly in sequence; each is a distinct mutation and a
    /// failure propagates without retrying the steps already completed.
    #[tracing::instrument(skip(self, items, address), fields(item_count = items.len()))]
    pub async fn place_order(
        &self,
        items: Vec<CartItem>,
        address: Address,
        delivery_method: DeliveryMethodId,
    ) -> Result<OrderId> {
        if items.is_empty() {
            return Err(FulfillmentError::EmptyCart);
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(FulfillmentError::InvalidQuantity(item.variant_id.clone()));
        }

        let checkout_id = self.graph.create_checkout(items).await?;
        self.graph
            .set_shipping_address(&checkout_id, address)
            .await?;
        self.graph
            .set_delivery_method(&checkout_id, delivery_method)
            .await?;

        let order_id = self.graph.complete_checkout(&checkout_id).await?;
        metrics::counter!("checkout_completed").increment(1);
        tracing::info!(%checkout_id, %order_id, "checkout completed");

        Ok(order_id)
    }
}
