//! # Collaborator Ports
//!
//! The traits through which the console reaches the rest of the system,
//! plus in-memory implementations used by tests and development.
//!
//! This core never mutates anything on the far side of a port: the
//! directory and stock service are read-only, the gateway is a
//! request/response call, and the order sink is fire-and-forget. Stock
//! decrement-on-sale happens downstream of the emitted `OrderCreated`,
//! never here.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use fieldline_core::tender::{GatewayOutcome, GatewayRequest};
use fieldline_core::types::OrderCreated;

// =============================================================================
// Customer Directory
// =============================================================================

/// A customer as the directory knows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Read-only customer lookup.
pub trait CustomerDirectory: Send + Sync {
    fn lookup(&self, customer_id: &str) -> Option<CustomerRecord>;
}

/// In-memory directory for tests and development.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    customers: HashMap<String, CustomerRecord>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a customer, builder-style.
    pub fn with_customer(mut self, record: CustomerRecord) -> Self {
        self.customers.insert(record.id.clone(), record);
        self
    }
}

impl CustomerDirectory for StaticDirectory {
    fn lookup(&self, customer_id: &str) -> Option<CustomerRecord> {
        self.customers.get(customer_id).cloned()
    }
}

// =============================================================================
// Stock / Inventory Service
// =============================================================================

/// Read-only view of sellable stock.
pub trait StockService: Send + Sync {
    /// The sellable maximum for an item; `None` when not inventory-tracked.
    fn stock_limit(&self, item_id: &str) -> Option<i64>;
}

/// In-memory stock limits for tests and development.
#[derive(Debug, Default)]
pub struct StaticStock {
    limits: HashMap<String, i64>,
}

impl StaticStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an item's limit, builder-style.
    pub fn with_limit(mut self, item_id: &str, limit: i64) -> Self {
        self.limits.insert(item_id.to_string(), limit);
        self
    }
}

impl StockService for StaticStock {
    fn stock_limit(&self, item_id: &str) -> Option<i64> {
        self.limits.get(item_id).copied()
    }
}

// =============================================================================
// Payment Gateway
// =============================================================================

/// The external payment gateway.
///
/// The single async boundary in the console: exactly one `submit` per
/// card/ACH attempt, with the tender machine holding in `Validating`
/// until the outcome is fed back.
pub trait PaymentGateway: Send + Sync {
    fn submit(
        &self,
        request: &GatewayRequest,
    ) -> impl std::future::Future<Output = GatewayOutcome> + Send;
}

/// A gateway that replays a scripted sequence of outcomes.
///
/// Pops the next scripted outcome per call; approves once the script is
/// exhausted.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    outcomes: Mutex<VecDeque<GatewayOutcome>>,
    submissions: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an outcome, builder-style.
    pub fn with_outcome(self, outcome: GatewayOutcome) -> Self {
        self.outcomes
            .lock()
            .expect("ScriptedGateway mutex poisoned")
            .push_back(outcome);
        self
    }

    /// How many submissions the gateway has seen.
    pub fn submission_count(&self) -> usize {
        self.submissions
            .lock()
            .expect("ScriptedGateway mutex poisoned")
            .len()
    }
}

impl PaymentGateway for ScriptedGateway {
    async fn submit(&self, request: &GatewayRequest) -> GatewayOutcome {
        self.submissions
            .lock()
            .expect("ScriptedGateway mutex poisoned")
            .push(request.clone());

        self.outcomes
            .lock()
            .expect("ScriptedGateway mutex poisoned")
            .pop_front()
            .unwrap_or(GatewayOutcome::Approved)
    }
}

// =============================================================================
// Order Sink
// =============================================================================

/// Downstream order/invoice persistence, fire-and-forget from here.
pub trait OrderSink: Send + Sync {
    fn record(&self, order: &OrderCreated);
}

/// An order queued for downstream persistence.
#[derive(Debug, Clone)]
pub struct QueuedOrder {
    pub order: OrderCreated,
    /// Full event as JSON, the shape downstream consumers receive.
    pub payload: String,
}

/// In-memory sink that queues orders the way an outbox would.
#[derive(Debug, Default)]
pub struct MemoryOrderSink {
    queue: Mutex<Vec<QueuedOrder>>,
}

impl MemoryOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders recorded so far.
    pub fn len(&self) -> usize {
        self.queue.lock().expect("MemoryOrderSink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the queued orders.
    pub fn recorded(&self) -> Vec<QueuedOrder> {
        self.queue
            .lock()
            .expect("MemoryOrderSink mutex poisoned")
            .clone()
    }
}

impl OrderSink for MemoryOrderSink {
    fn record(&self, order: &OrderCreated) {
        let payload = serde_json::to_string(order).unwrap_or_default();
        self.queue
            .lock()
            .expect("MemoryOrderSink mutex poisoned")
            .push(QueuedOrder {
                order: order.clone(),
                payload,
            });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fieldline_core::tender::TenderDetails;
    use fieldline_core::types::TenderMethod;

    #[test]
    fn test_static_directory_lookup() {
        let directory = StaticDirectory::new().with_customer(CustomerRecord {
            id: "cust-1".to_string(),
            name: "Dana Ortiz".to_string(),
            email: "dana@example.com".to_string(),
            phone: "555-0100".to_string(),
        });

        assert!(directory.lookup("cust-1").is_some());
        assert!(directory.lookup("cust-2").is_none());
    }

    #[test]
    fn test_static_stock_limits() {
        let stock = StaticStock::new().with_limit("itm-1", 4);
        assert_eq!(stock.stock_limit("itm-1"), Some(4));
        assert_eq!(stock.stock_limit("untracked"), None);
    }

    #[tokio::test]
    async fn test_scripted_gateway_replays_then_approves() {
        let gateway = ScriptedGateway::new().with_outcome(GatewayOutcome::Declined {
            code: "card_declined".to_string(),
        });
        let request = GatewayRequest {
            method: TenderMethod::TapToPay,
            amount_due_cents: 100,
            details: TenderDetails::TapToPay,
        };

        assert!(matches!(
            gateway.submit(&request).await,
            GatewayOutcome::Declined { .. }
        ));
        assert!(matches!(
            gateway.submit(&request).await,
            GatewayOutcome::Approved
        ));
        assert_eq!(gateway.submission_count(), 2);
    }

    #[test]
    fn test_memory_sink_queues_json_payload() {
        use chrono::Utc;

        let sink = MemoryOrderSink::new();
        let order = OrderCreated {
            order_id: "ord-1".to_string(),
            lines: vec![],
            customer_id: "cust-1".to_string(),
            subtotal_cents: 20599,
            tax_cents: 1648,
            total_cents: 22247,
            method: TenderMethod::Cash,
            change_cents: Some(2753),
            created_at: Utc::now(),
        };

        sink.record(&order);
        let recorded = sink.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].payload.contains("\"totalCents\":22247"));
    }
}
