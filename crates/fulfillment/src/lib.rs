//! Order fulfillment orchestration against an eventually consistent
//! commerce graph.
//!
//! The pipeline turns a cart of line items into a confirmed, fulfilled
//! order:
//! 1. Place the order via the checkout sequence (create, address,
//!    delivery, complete).
//! 2. Poll until the freshly created order is visible to reads.
//! 3. Resolve every cart variant to the order line id the graph assigned.
//! 4. Issue the fulfillment mutation under a bounded backoff-and-retry
//!    loop, classifying returned errors as transient or terminal.
//!
//! All network-dependent steps are bounded; nothing here holds durable
//! state of its own.

pub mod checkout;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod resolver;
pub mod retry;

pub use checkout::CheckoutCoordinator;
pub use error::FulfillmentError;
pub use orchestrator::{FulfillmentConfig, FulfillmentOrchestrator, FulfillmentOutcome};
pub use poller::ExistencePoller;
pub use resolver::OrderLineResolver;
pub use retry::RetryPolicy;
