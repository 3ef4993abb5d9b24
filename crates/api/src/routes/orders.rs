//! Order placement and fulfillment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CartItem, DeliveryMethodId, Money, OrderId};
use fulfillment::{CheckoutCoordinator, FulfillmentOrchestrator, FulfillmentOutcome};
use graph::{Address, CommerceGraph};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<G: CommerceGraph> {
    pub checkout: CheckoutCoordinator<G>,
    pub orchestrator: FulfillmentOrchestrator<G>,
    pub graph: G,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub address: AddressRequest,
    pub delivery_method: String,
}

#[derive(Deserialize)]
pub struct CartItemRequest {
    pub variant_id: String,
    pub name: String,
    pub quantity: u32,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct AddressRequest {
    pub name: String,
    pub street: String,
    pub city: String,
    pub country: String,
}

#[derive(Deserialize)]
pub struct FulfillRequest {
    pub items: Vec<CartItemRequest>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub order_id: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub id: String,
    pub variant_id: String,
    pub quantity: u32,
}

impl CartItemRequest {
    fn into_cart_item(self) -> CartItem {
        CartItem::new(
            self.variant_id,
            self.name,
            self.quantity,
            Money::from_cents(self.price_cents),
        )
    }
}

impl AddressRequest {
    fn into_address(self) -> Address {
        Address {
            name: self.name,
            street: self.street,
            city: self.city,
            country: self.country,
        }
    }
}

// -- Handlers --

/// POST /orders — place an order for a cart via the checkout sequence.
#[tracing::instrument(skip(state, req))]
pub async fn place<G: CommerceGraph + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderPlacedResponse>), ApiError> {
    let items: Vec<CartItem> = req
        .items
        .into_iter()
        .map(CartItemRequest::into_cart_item)
        .collect();

    let order_id = state
        .checkout
        .place_order(
            items,
            req.address.into_address(),
            DeliveryMethodId::new(req.delivery_method),
        )
        .await?;

    let response = OrderPlacedResponse {
        order_id: order_id.to_string(),
    };

    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// GET /orders/:id — point read of an order from the graph.
///
/// No polling here: an order still inside its replication window returns
/// 404 just as the graph reports it.
#[tracing::instrument(skip(state))]
pub async fn get<G: CommerceGraph + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(id.as_str());
    let order = state
        .graph
        .get_order(&order_id)
        .await
        .map_err(|e| ApiError::Fulfillment(e.into()))?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    let lines = order
        .lines
        .iter()
        .map(|line| OrderLineResponse {
            id: line.id.to_string(),
            variant_id: line.variant_id.to_string(),
            quantity: line.quantity,
        })
        .collect();

    Ok(Json(OrderResponse {
        id: order.id.to_string(),
        lines,
    }))
}

/// POST /orders/:id/fulfillments — run the fulfillment orchestration.
///
/// A fulfilled or rejected outcome is a 200 with the outcome body; fatal
/// pipeline errors map to error statuses via [`ApiError`].
#[tracing::instrument(skip(state, req))]
pub async fn fulfill<G: CommerceGraph + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<FulfillRequest>,
) -> Result<Json<FulfillmentOutcome>, ApiError> {
    let order_id = OrderId::new(id.as_str());
    let items: Vec<CartItem> = req
        .items
        .into_iter()
        .map(CartItemRequest::into_cart_item)
        .collect();

    let outcome = state.orchestrator.fulfill_order(&order_id, &items).await?;
    Ok(Json(outcome))
}
