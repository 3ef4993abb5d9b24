//! Contract with the external headless-commerce graph.
//!
//! The graph owns all durable state: checkouts, orders, order lines, and
//! stock. This crate defines the small set of GraphQL-shaped operations the
//! fulfillment service depends on, the wire types they exchange, and an
//! in-memory scripted implementation used by tests and the demo server.
//!
//! The graph is eventually consistent for reads: an order created by
//! completing a checkout may not be visible to an immediately following
//! point read. Callers are expected to tolerate `Ok(None)` from
//! [`CommerceGraph::get_order`] shortly after order creation.

pub mod client;
pub mod error;
pub mod memory;
pub mod types;

pub use client::CommerceGraph;
pub use error::{GraphError, MutationError};
pub use memory::InMemoryCommerceGraph;
pub use types::{
    Address, Fulfillment, FulfillmentLine, FulfillmentPayload, FulfillmentRequest, Order,
    OrderLine, StockAllocation,
};
