//! The commerce graph client trait.

use async_trait::async_trait;

use common::{CartItem, CheckoutId, DeliveryMethodId, OrderId};

use crate::error::Result;
use crate::types::{Address, FulfillmentPayload, FulfillmentRequest, Order};

/// Operations the fulfillment service performs against the external
/// commerce graph. Signatures are fixed external contracts.
///
/// All durable state lives behind this trait; implementations must be safe
/// to share across concurrent checkouts.
#[async_trait]
pub trait CommerceGraph: Send + Sync {
    /// Point read of an order by id.
    ///
    /// Returns `Ok(None)` when the order is not visible to the read path,
    /// which right after creation does not mean it will never be.
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Creates a checkout holding the given cart items.
    async fn create_checkout(&self, items: Vec<CartItem>) -> Result<CheckoutId>;

    /// Attaches a shipping address to a checkout.
    async fn set_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: Address,
    ) -> Result<()>;

    /// Attaches a delivery method to a checkout.
    async fn set_delivery_method(
        &self,
        checkout_id: &CheckoutId,
        method_id: DeliveryMethodId,
    ) -> Result<()>;

    /// Completes a checkout, creating an order as a side effect.
    ///
    /// The returned order id is authoritative but the order may not be
    /// immediately visible to [`CommerceGraph::get_order`].
    async fn complete_checkout(&self, checkout_id: &CheckoutId) -> Result<OrderId>;

    /// Issues the "fulfill order" mutation.
    ///
    /// A transport-level `Err` means the call may or may not have taken
    /// effect; structured rejections come back inside the payload.
    async fn fulfill_order(&self, request: FulfillmentRequest) -> Result<FulfillmentPayload>;
}
