//! In-memory commerce graph for tests and the demo server.
//!
//! Orders created here can be given a visibility lag: a number of point
//! reads that still return `None` before the order becomes visible, which
//! reproduces the real graph's read-after-write behavior. Fulfillment
//! responses can be scripted per call to exercise retry paths.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use common::{CartItem, CheckoutId, DeliveryMethodId, OrderId, OrderLineId, VariantId};

use crate::client::CommerceGraph;
use crate::error::{GraphError, MutationError, Result};
use crate::types::{Address, Fulfillment, FulfillmentPayload, FulfillmentRequest, Order, OrderLine};

#[derive(Debug, Default)]
struct CheckoutDraft {
    items: Vec<CartItem>,
    address: Option<Address>,
    delivery_method: Option<DeliveryMethodId>,
}

#[derive(Debug, Default)]
struct GraphState {
    checkouts: HashMap<CheckoutId, CheckoutDraft>,
    orders: HashMap<OrderId, Order>,
    /// Remaining point reads that still miss, per order.
    visibility_lag: HashMap<OrderId, u32>,
    /// Scripted visibility outcomes consumed front-to-back by `get_order`;
    /// `false` forces a miss regardless of stored orders.
    visibility_script: VecDeque<bool>,
    /// Lag applied to orders created via `complete_checkout`.
    default_lag: u32,
    /// Scripted responses consumed front-to-back by `fulfill_order`.
    fulfillment_script: VecDeque<FulfillmentPayload>,
    /// Every fulfillment request received, in order.
    fulfill_requests: Vec<FulfillmentRequest>,
    get_order_calls: u32,
    next_id: u32,
    fail_fulfill_transport: u32,
}

/// In-memory scripted implementation of [`CommerceGraph`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommerceGraph {
    state: Arc<RwLock<GraphState>>,
}

impl InMemoryCommerceGraph {
    /// Creates an empty in-memory graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an order directly, visible only after `lag` point reads.
    pub fn insert_order(&self, order: Order, lag: u32) {
        let mut state = self.state.write().unwrap();
        if lag > 0 {
            state.visibility_lag.insert(order.id.clone(), lag);
        }
        state.orders.insert(order.id.clone(), order);
    }

    /// Builds and inserts an order for the given cart items, one line per
    /// item, with generated line ids. Returns the order.
    pub fn insert_order_for_items(&self, order_id: &OrderId, items: &[CartItem], lag: u32) -> Order {
        let lines = {
            let mut state = self.state.write().unwrap();
            items
                .iter()
                .map(|item| {
                    state.next_id += 1;
                    OrderLine {
                        id: OrderLineId::new(format!("line_{:04}", state.next_id)),
                        variant_id: item.variant_id.clone(),
                        quantity: item.quantity,
                    }
                })
                .collect()
        };
        let order = Order {
            id: order_id.clone(),
            lines,
        };
        self.insert_order(order.clone(), lag);
        order
    }

    /// Sets the visibility lag applied to orders created by completing a
    /// checkout.
    pub fn set_default_visibility_lag(&self, lag: u32) {
        self.state.write().unwrap().default_lag = lag;
    }

    /// Queues a scripted response for the next `fulfill_order` call. Once
    /// the script runs out, calls succeed with a generated fulfillment.
    pub fn script_fulfillment(&self, payload: FulfillmentPayload) {
        self.state
            .write()
            .unwrap()
            .fulfillment_script
            .push_back(payload);
    }

    /// Scripts the next `get_order` outcomes: each `false` forces a miss,
    /// each `true` performs a normal lookup. Later calls fall back to the
    /// per-order visibility lag.
    pub fn script_order_visibility(&self, outcomes: impl IntoIterator<Item = bool>) {
        self.state
            .write()
            .unwrap()
            .visibility_script
            .extend(outcomes);
    }

    /// Makes the next `count` fulfill calls fail at the transport level.
    pub fn fail_fulfill_transport(&self, count: u32) {
        self.state.write().unwrap().fail_fulfill_transport = count;
    }

    /// Returns the number of `fulfill_order` calls received.
    pub fn fulfill_call_count(&self) -> usize {
        self.state.read().unwrap().fulfill_requests.len()
    }

    /// Returns the number of `get_order` calls received.
    pub fn get_order_call_count(&self) -> u32 {
        self.state.read().unwrap().get_order_calls
    }

    /// Returns every fulfillment request received so far.
    pub fn fulfill_requests(&self) -> Vec<FulfillmentRequest> {
        self.state.read().unwrap().fulfill_requests.clone()
    }

    /// Looks up the line id the graph assigned for a variant of an order,
    /// bypassing visibility lag. Test helper.
    pub fn assigned_line_id(&self, order_id: &OrderId, variant_id: &VariantId) -> Option<OrderLineId> {
        let state = self.state.read().unwrap();
        state
            .orders
            .get(order_id)
            .and_then(|order| order.line_for_variant(variant_id))
            .map(|line| line.id.clone())
    }
}

#[async_trait]
impl CommerceGraph for InMemoryCommerceGraph {
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let mut state = self.state.write().unwrap();
        state.get_order_calls += 1;

        if let Some(visible) = state.visibility_script.pop_front() {
            if !visible {
                return Ok(None);
            }
            return Ok(state.orders.get(order_id).cloned());
        }

        if let Some(lag) = state.visibility_lag.get_mut(order_id) {
            if *lag > 0 {
                *lag -= 1;
                return Ok(None);
            }
            state.visibility_lag.remove(order_id);
        }

        Ok(state.orders.get(order_id).cloned())
    }

    async fn create_checkout(&self, items: Vec<CartItem>) -> Result<CheckoutId> {
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let checkout_id = CheckoutId::new(format!("checkout_{:04}", state.next_id));
        state.checkouts.insert(
            checkout_id.clone(),
            CheckoutDraft {
                items,
                ..CheckoutDraft::default()
            },
        );
        Ok(checkout_id)
    }

    async fn set_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: Address,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let draft = state
            .checkouts
            .get_mut(checkout_id)
            .ok_or_else(|| GraphError::UnknownCheckout(checkout_id.clone()))?;
        draft.address = Some(address);
        Ok(())
    }

    async fn set_delivery_method(
        &self,
        checkout_id: &CheckoutId,
        method_id: DeliveryMethodId,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let draft = state
            .checkouts
            .get_mut(checkout_id)
            .ok_or_else(|| GraphError::UnknownCheckout(checkout_id.clone()))?;
        draft.delivery_method = Some(method_id);
        Ok(())
    }

    async fn complete_checkout(&self, checkout_id: &CheckoutId) -> Result<OrderId> {
        let mut state = self.state.write().unwrap();
        let draft = state
            .checkouts
            .remove(checkout_id)
            .ok_or_else(|| GraphError::UnknownCheckout(checkout_id.clone()))?;

        if draft.address.is_none() {
            return Err(GraphError::InvalidRequest(format!(
                "checkout {checkout_id} has no shipping address"
            )));
        }
        if draft.delivery_method.is_none() {
            return Err(GraphError::InvalidRequest(format!(
                "checkout {checkout_id} has no delivery method"
            )));
        }

        state.next_id += 1;
        let order_id = OrderId::new(format!("order_{:04}", state.next_id));
        let lines = draft
            .items
            .iter()
            .map(|item| {
                state.next_id += 1;
                OrderLine {
                    id: OrderLineId::new(format!("line_{:04}", state.next_id)),
                    variant_id: item.variant_id.clone(),
                    quantity: item.quantity,
                }
            })
            .collect();

        let default_lag = state.default_lag;
        if default_lag > 0 {
            state
                .visibility_lag
                .insert(order_id.clone(), default_lag);
        }
        state.orders.insert(
            order_id.clone(),
            Order {
                id: order_id.clone(),
                lines,
            },
        );

        Ok(order_id)
    }

    async fn fulfill_order(&self, request: FulfillmentRequest) -> Result<FulfillmentPayload> {
        let mut state = self.state.write().unwrap();

        if state.fail_fulfill_transport > 0 {
            state.fail_fulfill_transport -= 1;
            return Err(GraphError::Transport("connection reset".to_string()));
        }

        state.fulfill_requests.push(request.clone());

        if let Some(scripted) = state.fulfillment_script.pop_front() {
            return Ok(scripted);
        }

        if !state.orders.contains_key(&request.order_id) {
            return Ok(FulfillmentPayload::failure(vec![MutationError::message(
                format!("Order {} does not exist", request.order_id),
            )]));
        }

        state.next_id += 1;
        Ok(FulfillmentPayload::success(vec![Fulfillment {
            id: format!("fulfillment_{:04}", state.next_id),
            status: "FULFILLED".to_string(),
        }]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, WarehouseId};
    use crate::types::{FulfillmentLine, StockAllocation};
    use uuid::Uuid;

    fn cart() -> Vec<CartItem> {
        vec![CartItem::new(
            "v1",
            "Tusker Lager",
            2,
            Money::from_cents(15000),
        )]
    }

    #[tokio::test]
    async fn order_becomes_visible_after_lag_reads() {
        let graph = InMemoryCommerceGraph::new();
        let order_id = OrderId::new("order_123");
        graph.insert_order_for_items(&order_id, &cart(), 2);

        assert!(graph.get_order(&order_id).await.unwrap().is_none());
        assert!(graph.get_order(&order_id).await.unwrap().is_none());
        let order = graph.get_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(graph.get_order_call_count(), 3);
    }

    #[tokio::test]
    async fn checkout_flow_creates_order_with_lines() {
        let graph = InMemoryCommerceGraph::new();
        let checkout_id = graph.create_checkout(cart()).await.unwrap();
        graph
            .set_shipping_address(
                &checkout_id,
                Address {
                    name: "Asha Odhiambo".to_string(),
                    street: "Moi Avenue 12".to_string(),
                    city: "Nairobi".to_string(),
                    country: "KE".to_string(),
                },
            )
            .await
            .unwrap();
        graph
            .set_delivery_method(&checkout_id, DeliveryMethodId::new("dm_standard"))
            .await
            .unwrap();

        let order_id = graph.complete_checkout(&checkout_id).await.unwrap();
        let order = graph.get_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].variant_id, common::VariantId::new("v1"));
    }

    #[tokio::test]
    async fn complete_checkout_requires_address_and_delivery() {
        let graph = InMemoryCommerceGraph::new();
        let checkout_id = graph.create_checkout(cart()).await.unwrap();

        let result = graph.complete_checkout(&checkout_id).await;
        assert!(matches!(result, Err(GraphError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn scripted_fulfillment_responses_are_consumed_in_order() {
        let graph = InMemoryCommerceGraph::new();
        let order_id = OrderId::new("order_123");
        let order = graph.insert_order_for_items(&order_id, &cart(), 0);

        graph.script_fulfillment(FulfillmentPayload::failure(vec![MutationError::message(
            "Order line not found",
        )]));

        let request = FulfillmentRequest {
            order_id: order_id.clone(),
            lines: vec![FulfillmentLine {
                order_line_id: order.lines[0].id.clone(),
                stocks: vec![StockAllocation {
                    quantity: 2,
                    warehouse_id: WarehouseId::new("wh1"),
                }],
            }],
            notify_customer: false,
            allow_stock_to_be_exceeded: false,
            idempotency_key: Uuid::new_v4(),
        };

        let first = graph.fulfill_order(request.clone()).await.unwrap();
        assert!(!first.is_success());

        let second = graph.fulfill_order(request).await.unwrap();
        assert!(second.is_success());
        assert_eq!(graph.fulfill_call_count(), 2);
    }

    #[tokio::test]
    async fn transport_failures_are_injected_before_recording() {
        let graph = InMemoryCommerceGraph::new();
        graph.fail_fulfill_transport(1);

        let request = FulfillmentRequest {
            order_id: OrderId::new("order_123"),
            lines: vec![],
            notify_customer: false,
            allow_stock_to_be_exceeded: false,
            idempotency_key: Uuid::new_v4(),
        };

        assert!(graph.fulfill_order(request.clone()).await.is_err());
        assert_eq!(graph.fulfill_call_count(), 0);

        // Unknown order after the transport failure drains: transient error.
        let payload = graph.fulfill_order(request).await.unwrap();
        assert!(payload.errors[0].is_transient());
    }
}
