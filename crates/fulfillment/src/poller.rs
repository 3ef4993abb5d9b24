//! Existence poller for freshly created orders.

use common::OrderId;
use graph::CommerceGraph;

use crate::error::Result;
use crate::retry::RetryPolicy;

/// Polls the graph until a newly created order becomes visible to reads.
///
/// Orders are created as a side effect of completing a checkout and the
/// graph's read path may lag the write. The poller issues point reads with
/// an increasing delay between them and gives up after a fixed number of
/// attempts. Absence after the budget is not an error: a `false` result
/// tells the caller the order is not yet safely usable.
pub struct ExistencePoller<G> {
    graph: G,
    policy: RetryPolicy,
}

impl<G: CommerceGraph> ExistencePoller<G> {
    /// Creates a poller with the given polling policy.
    pub fn new(graph: G, policy: RetryPolicy) -> Self {
        Self { graph, policy }
    }

    /// Returns true once the graph's read path returns the order.
    ///
    /// Transport errors propagate; replication lag does not.
    pub async fn wait_for_order(&self, order_id: &OrderId) -> Result<bool> {
        for attempt in 1..=self.policy.max_attempts {
            if self.graph.get_order(order_id).await?.is_some() {
                return Ok(true);
            }

            if self.policy.should_retry(attempt) {
                let delay = self.policy.delay_for_attempt(attempt);
                tracing::debug!(%order_id, attempt, ?delay, "order not yet visible");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(%order_id, attempts = self.policy.max_attempts, "order never became visible");
        Ok(false)
    }
}
