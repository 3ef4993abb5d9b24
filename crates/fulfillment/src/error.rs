//! Fulfillment error types.
//!
//! These cover the fatal/operational conditions of the pipeline. Terminal
//! business rejections are not errors: they come back inside
//! [`crate::FulfillmentOutcome::Rejected`].

use common::{OrderId, VariantId};
use graph::GraphError;
use thiserror::Error;

/// Errors that abort a fulfillment orchestration.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The order never became visible to the graph's read path within the
    /// polling budget. No mutation was issued.
    #[error("order {0} never became visible")]
    OrderNeverVisible(OrderId),

    /// A cart variant has no matching line in the order. No mutation was
    /// issued; the whole batch fails before the first fulfillment attempt.
    #[error("no order line for variant {variant_id} in order {order_id}")]
    LineMappingNotFound {
        order_id: OrderId,
        variant_id: VariantId,
    },

    /// Every retry attempt was consumed without the graph accepting the
    /// fulfillment. Operational failure, distinct from a business rejection.
    #[error("fulfillment of order {order_id} exhausted after {attempts} attempts")]
    AttemptsExhausted { order_id: OrderId, attempts: u32 },

    /// The cart is empty; there is nothing to fulfill.
    #[error("cart has no items")]
    EmptyCart,

    /// A cart item carries a zero quantity.
    #[error("invalid quantity 0 for variant {0}")]
    InvalidQuantity(VariantId),

    /// A graph call failed at the transport or protocol level.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
