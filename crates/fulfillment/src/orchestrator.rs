//! Fulfillment orchestrator.
//!
//! Drives an order from "confirmed to exist" to "fulfilled" as one
//! sequential pipeline: poll for existence, resolve every cart line once,
//! then retry the fulfillment mutation with bounded exponential backoff.
//! There is no shared state between orchestrations and no cancellation;
//! every suspension point is a timed sleep.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use common::{CartItem, OrderId, WarehouseId};
use graph::{CommerceGraph, Fulfillment, FulfillmentRequest, MutationError};

use crate::error::{FulfillmentError, Result};
use crate::poller::ExistencePoller;
use crate::resolver::OrderLineResolver;
use crate::retry::RetryPolicy;

/// Tuning for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct FulfillmentConfig {
    /// Policy for the initial existence poll.
    pub poll: RetryPolicy,
    /// Policy for the fulfillment attempt loop.
    pub retry: RetryPolicy,
    /// Warehouse stock is allocated from.
    pub warehouse_id: WarehouseId,
    /// Forwarded on every fulfillment request.
    pub notify_customer: bool,
    /// Forwarded on every fulfillment request.
    pub allow_stock_to_be_exceeded: bool,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            poll: RetryPolicy::for_existence_polling(),
            retry: RetryPolicy::default(),
            warehouse_id: WarehouseId::new("wh_primary"),
            notify_customer: true,
            allow_stock_to_be_exceeded: false,
        }
    }
}

/// Outcome of a fulfillment orchestration that ran to a decision.
///
/// Business rejections are a returned outcome, not an error; fatal
/// operational conditions come back as [`FulfillmentError`] instead.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FulfillmentOutcome {
    /// The graph accepted the fulfillment.
    Fulfilled {
        /// Fulfillment records created by the graph.
        fulfillments: Vec<Fulfillment>,
        /// Attempts consumed, including the successful one.
        attempts: u32,
        /// When the orchestration finished.
        completed_at: DateTime<Utc>,
    },
    /// The graph rejected the request with non-transient errors.
    Rejected {
        /// The structured errors returned by the mutation.
        errors: Vec<MutationError>,
        /// Attempts consumed, including the rejected one.
        attempts: u32,
    },
}

impl FulfillmentOutcome {
    /// Returns true for a fulfilled outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, FulfillmentOutcome::Fulfilled { .. })
    }

    /// Attempts consumed by the orchestration.
    pub fn attempts(&self) -> u32 {
        match self {
            FulfillmentOutcome::Fulfilled { attempts, .. } => *attempts,
            FulfillmentOutcome::Rejected { attempts, .. } => *attempts,
        }
    }
}

/// Orchestrates fulfillment of a single order against the commerce graph.
pub struct FulfillmentOrchestrator<G> {
    graph: G,
    config: FulfillmentConfig,
}

impl<G: CommerceGraph + Clone> FulfillmentOrchestrator<G> {
    /// Creates an orchestrator with the given configuration.
    pub fn new(graph: G, config: FulfillmentConfig) -> Self {
        Self { graph, config }
    }

    /// Fulfills an order for the given cart items.
    ///
    /// Strict step order: confirm the order exists, resolve every
    /// variant-to-line mapping eagerly (no mutation is issued if any line
    /// is missing), then attempt the fulfillment mutation under the bounded
    /// retry policy. Each attempt re-verifies the order is still visible;
    /// an invisible re-check consumes an attempt like any other transient
    /// failure, so total exposure is bounded.
    ///
    /// One idempotency key identifies this fulfillment intent across all
    /// of its attempts, so a resubmission after a lost response can be
    /// deduplicated upstream.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn fulfill_order(
        &self,
        order_id: &OrderId,
        items: &[CartItem],
    ) -> Result<FulfillmentOutcome> {
        metrics::counter!("fulfillment_started_total").increment(1);
        let started = std::time::Instant::now();

        if items.is_empty() {
            return Err(FulfillmentError::EmptyCart);
        }

        let poller = ExistencePoller::new(self.graph.clone(), self.config.poll.clone());
        if !poller.wait_for_order(order_id).await? {
            metrics::counter!("fulfillment_never_visible").increment(1);
            return Err(FulfillmentError::OrderNeverVisible(order_id.clone()));
        }

        let resolver = OrderLineResolver::new(self.graph.clone());
        let lines = resolver
            .resolve_lines(order_id, items, &self.config.warehouse_id)
            .await?;

        let intent_key = Uuid::new_v4();
        let mut attempt: u32 = 1;

        loop {
            let failure_reason = match self.graph.get_order(order_id).await {
                Ok(Some(_)) => {
                    let request = FulfillmentRequest {
                        order_id: order_id.clone(),
                        lines: lines.clone(),
                        notify_customer: self.config.notify_customer,
                        allow_stock_to_be_exceeded: self.config.allow_stock_to_be_exceeded,
                        idempotency_key: intent_key,
                    };

                    match self.graph.fulfill_order(request).await {
                        Ok(payload) if payload.is_success() => {
                            let duration = started.elapsed().as_secs_f64();
                            metrics::histogram!("fulfillment_duration_seconds").record(duration);
                            metrics::counter!("fulfillment_completed").increment(1);
                            tracing::info!(%order_id, attempt, duration, "order fulfilled");
                            return Ok(FulfillmentOutcome::Fulfilled {
                                fulfillments: payload.fulfillments,
                                attempts: attempt,
                                completed_at: Utc::now(),
                            });
                        }
                        Ok(payload) => {
                            if payload.errors.iter().all(MutationError::is_transient) {
                                format!("transient graph errors: {}", join_errors(&payload.errors))
                            } else {
                                metrics::counter!("fulfillment_rejected").increment(1);
                                tracing::warn!(
                                    %order_id,
                                    attempt,
                                    errors = %join_errors(&payload.errors),
                                    "fulfillment rejected"
                                );
                                return Ok(FulfillmentOutcome::Rejected {
                                    errors: payload.errors,
                                    attempts: attempt,
                                });
                            }
                        }
                        // The response was lost; the intent key lets the
                        // graph deduplicate the resubmission.
                        Err(err) => err.to_string(),
                    }
                }
                Ok(None) => "order no longer visible".to_string(),
                Err(err) => err.to_string(),
            };

            if !self.config.retry.should_retry(attempt) {
                metrics::counter!("fulfillment_exhausted").increment(1);
                tracing::error!(%order_id, attempts = attempt, "fulfillment attempts exhausted");
                return Err(FulfillmentError::AttemptsExhausted {
                    order_id: order_id.clone(),
                    attempts: attempt,
                });
            }

            let delay = self.config.retry.delay_for_attempt(attempt);
            metrics::counter!("fulfillment_retries_total").increment(1);
            tracing::warn!(
                %order_id,
                attempt,
                ?delay,
                reason = %failure_reason,
                "fulfillment attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn join_errors(errors: &[MutationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;
    use graph::{FulfillmentPayload, InMemoryCommerceGraph};

    fn fast_config() -> FulfillmentConfig {
        FulfillmentConfig {
            poll: RetryPolicy::for_existence_polling().without_delays(),
            retry: RetryPolicy::default().without_delays(),
            ..FulfillmentConfig::default()
        }
    }

    fn cart() -> Vec<CartItem> {
        vec![CartItem::new("v1", "Tusker Lager", 2, Money::from_cents(15000))]
    }

    fn seeded(lag: u32) -> (FulfillmentOrchestrator<InMemoryCommerceGraph>, InMemoryCommerceGraph, OrderId) {
        let graph = InMemoryCommerceGraph::new();
        let order_id = OrderId::new("order_123");
        graph.insert_order_for_items(&order_id, &cart(), lag);
        let orchestrator = FulfillmentOrchestrator::new(graph.clone(), fast_config());
        (orchestrator, graph, order_id)
    }

    #[tokio::test]
    async fn happy_path_fulfills_on_first_attempt() {
        let (orchestrator, graph, order_id) = seeded(0);

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(graph.fulfill_call_count(), 1);

        let request = &graph.fulfill_requests()[0];
        assert_eq!(request.order_id, order_id);
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.lines[0].stocks[0].quantity, 2);
    }

    #[tokio::test]
    async fn invisible_order_aborts_before_any_mutation() {
        let graph = InMemoryCommerceGraph::new();
        let order_id = OrderId::new("order_missing");
        let orchestrator = FulfillmentOrchestrator::new(graph.clone(), fast_config());

        let result = orchestrator.fulfill_order(&order_id, &cart()).await;
        assert!(matches!(result, Err(FulfillmentError::OrderNeverVisible(_))));
        assert_eq!(graph.fulfill_call_count(), 0);
        // Only the poller's reads happened; resolution was never reached.
        assert_eq!(graph.get_order_call_count(), 5);
    }

    #[tokio::test]
    async fn resolution_failure_aborts_before_any_mutation() {
        let (orchestrator, graph, order_id) = seeded(0);

        let unknown = vec![CartItem::new("v9", "Phantom", 1, Money::from_cents(100))];
        let result = orchestrator.fulfill_order(&order_id, &unknown).await;
        assert!(matches!(
            result,
            Err(FulfillmentError::LineMappingNotFound { .. })
        ));
        assert_eq!(graph.fulfill_call_count(), 0);
    }

    #[tokio::test]
    async fn transient_error_then_success_takes_two_attempts() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.script_fulfillment(FulfillmentPayload::failure(vec![MutationError::message(
            "Order line line_abc not found",
        )]));

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(graph.fulfill_call_count(), 2);
    }

    #[tokio::test]
    async fn terminal_error_returns_rejection_without_retry() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.script_fulfillment(FulfillmentPayload::failure(vec![MutationError::new(
            "stocks",
            "Insufficient stock in warehouse wh_primary",
            "INSUFFICIENT_STOCK",
        )]));

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        match outcome {
            FulfillmentOutcome::Rejected { ref errors, attempts } => {
                assert_eq!(attempts, 1);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code.as_deref(), Some("INSUFFICIENT_STOCK"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(graph.fulfill_call_count(), 1);
    }

    #[tokio::test]
    async fn mixed_errors_are_terminal() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.script_fulfillment(FulfillmentPayload::failure(vec![
            MutationError::message("Order line not found"),
            MutationError::message("Insufficient stock"),
        ]));

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(graph.fulfill_call_count(), 1);
    }

    #[tokio::test]
    async fn five_transient_failures_exhaust_the_budget() {
        let (orchestrator, graph, order_id) = seeded(0);
        for _ in 0..5 {
            graph.script_fulfillment(FulfillmentPayload::failure(vec![MutationError::message(
                "Order does not exist",
            )]));
        }

        let result = orchestrator.fulfill_order(&order_id, &cart()).await;
        assert!(matches!(
            result,
            Err(FulfillmentError::AttemptsExhausted { attempts: 5, .. })
        ));
        assert_eq!(graph.fulfill_call_count(), 5);
    }

    #[tokio::test]
    async fn invisible_recheck_consumes_the_attempt_counter() {
        let (orchestrator, graph, order_id) = seeded(0);
        // Poller read, resolver read, then three invisible re-checks before
        // the loop sees the order again.
        graph.script_order_visibility([true, true, false, false, false]);

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 4);
        assert_eq!(graph.fulfill_call_count(), 1);
    }

    #[tokio::test]
    async fn permanently_invisible_recheck_exhausts_without_mutation() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.script_order_visibility([true, true, false, false, false, false, false]);

        let result = orchestrator.fulfill_order(&order_id, &cart()).await;
        assert!(matches!(
            result,
            Err(FulfillmentError::AttemptsExhausted { attempts: 5, .. })
        ));
        assert_eq!(graph.fulfill_call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_retried_with_the_same_intent_key() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.fail_fulfill_transport(1);

        let outcome = orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 2);
    }

    #[tokio::test]
    async fn intent_key_is_stable_across_retries_and_fresh_per_call() {
        let (orchestrator, graph, order_id) = seeded(0);
        graph.script_fulfillment(FulfillmentPayload::failure(vec![MutationError::message(
            "Order line not found",
        )]));

        orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();
        orchestrator.fulfill_order(&order_id, &cart()).await.unwrap();

        let requests = graph.fulfill_requests();
        assert_eq!(requests.len(), 3);
        // First orchestration: two attempts, one key.
        assert_eq!(requests[0].idempotency_key, requests[1].idempotency_key);
        // Second orchestration gets its own key.
        assert_ne!(requests[1].idempotency_key, requests[2].idempotency_key);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_up_front() {
        let (orchestrator, graph, order_id) = seeded(0);

        let result = orchestrator.fulfill_order(&order_id, &[]).await;
        assert!(matches!(result, Err(FulfillmentError::EmptyCart)));
        assert_eq!(graph.get_order_call_count(), 0);
    }
}
