//! Background monitor — the autonomous scan-and-resolve loop.
//!
//! One task, one iteration at a time: scan open orders, check carrier
//! tracking, and drive the pipeline for anything running late. A faulty
//! order is published and skipped; it never takes the loop down. The
//! processed-set lives inside the struct and is reset through an explicit
//! administrative call; it is not persisted, so a restart re-examines
//! orders (the ledger's dedup gate makes that harmless).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::events::ActivityBus;
use crate::integrations::{TrackingProvider, TrackingStatus};
use crate::pipeline::{Pipeline, ResolveRequest};
use crate::store::GraphStore;
use crate::types::OrderWithCustomer;

pub struct Monitor {
    store: Arc<dyn GraphStore>,
    tracking: Arc<dyn TrackingProvider>,
    pipeline: Arc<Pipeline>,
    bus: ActivityBus,
    interval: Duration,
    stop: AtomicBool,
    processed: Mutex<HashSet<String>>,
}

impl Monitor {
    pub fn new(
        store: Arc<dyn GraphStore>,
        tracking: Arc<dyn TrackingProvider>,
        pipeline: Arc<Pipeline>,
        bus: ActivityBus,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            tracking,
            pipeline,
            bus,
            interval,
            stop: AtomicBool::new(false),
            processed: Mutex::new(HashSet::new()),
        }
    }

    /// Run until [`Monitor::stop`] is called. The flag is observed at the
    /// top of each iteration, so stop latency is bounded by the interval.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "monitor loop started");
        loop {
            if self.stop.load(Ordering::SeqCst) {
                tracing::info!("monitor loop stopping");
                return;
            }
            if let Err(err) = self.scan_once().await {
                tracing::warn!(%err, "monitor iteration failed, will retry next interval");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One full scan over the open orders.
    pub async fn scan_once(&self) -> crate::error::Result<()> {
        let orders = self.store.all_orders().await?;

        for row in orders {
            if row.order.status.is_terminal() || self.is_processed(&row.order.id) {
                continue;
            }
            // Per-order isolation: one bad order must not stop the rest.
            if let Err(err) = self.examine(&row).await {
                tracing::warn!(order_id = %row.order.id, %err, "order skipped this iteration");
            }
        }
        Ok(())
    }

    async fn examine(&self, row: &OrderWithCustomer) -> crate::error::Result<()> {
        let report = self.tracking.check(&row.order.tracking_ref).await?;
        if report.status != TrackingStatus::Delayed || report.days_late <= 0 {
            return Ok(());
        }

        self.bus.delay_detected(
            &row.order.id,
            &row.customer_name,
            &row.order.carrier,
            report.days_late,
        );

        let message = format!(
            "PROACTIVE ALERT: Carrier tracking shows Order {} ({}) is {} days late. \
             Customer {} is a {} customer.",
            row.order.id, row.order.product, report.days_late, row.customer_name, row.tier
        );
        self.pipeline
            .resolve(ResolveRequest::delay(
                row.customer_id.clone(),
                message,
                report.days_late,
                row.order.id.clone(),
            ))
            .await?;

        self.mark_processed(&row.order.id);
        Ok(())
    }

    /// Request a cooperative stop; takes effect at the next iteration.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Administrative reset of the processed-order set.
    pub fn reset(&self) {
        let mut processed = self.processed.lock().expect("processed set poisoned");
        let dropped = processed.len();
        processed.clear();
        tracing::info!(dropped, "monitor processed-set reset");
    }

    pub fn processed_count(&self) -> usize {
        self.processed.lock().expect("processed set poisoned").len()
    }

    fn is_processed(&self, order_id: &str) -> bool {
        self.processed
            .lock()
            .expect("processed set poisoned")
            .contains(order_id)
    }

    fn mark_processed(&self, order_id: &str) {
        self.processed
            .lock()
            .expect("processed set poisoned")
            .insert(order_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::integrations::{MockCommerce, MockSearch, MockTracking, TrackingReport};
    use crate::pipeline::DecisionService;
    use crate::store::MemoryGraph;
    use async_trait::async_trait;
    use decision_agent::{Decision, DecisionAction};

    struct StubDecision;

    #[async_trait]
    impl DecisionService for StubDecision {
        async fn decide(&self, _: &str, _: &str) -> decision_agent::Result<Decision> {
            Ok(Decision {
                action: DecisionAction::ApplyCredit,
                message: "credit applied".into(),
                credit_amount: 20.0,
                requires_human_review: false,
                reasoning: String::new(),
            })
        }
    }

    fn monitor_with(
        store: Arc<MemoryGraph>,
        tracking: Arc<dyn TrackingProvider>,
        interval: Duration,
    ) -> Arc<Monitor> {
        let bus = ActivityBus::default();
        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            Arc::new(StubDecision),
            Arc::new(MockCommerce),
            Arc::new(MockSearch),
            bus.clone(),
            PolicyConfig::default(),
            "Redress Sneaker Co.".into(),
        ));
        Arc::new(Monitor::new(store, tracking, pipeline, bus, interval))
    }

    #[tokio::test]
    async fn delayed_order_is_processed_exactly_once() {
        let store = Arc::new(MemoryGraph::seeded());
        let tracking = Arc::new(MockTracking::new());
        tracking.script("demo-tracking-001", TrackingReport::delayed(4));
        let monitor = monitor_with(store.clone(), tracking, Duration::from_secs(60));

        monitor.scan_once().await.unwrap();
        monitor.scan_once().await.unwrap();

        assert_eq!(monitor.processed_count(), 1);
        assert_eq!(store.issues_for_order("order-1042").await.unwrap().len(), 1);
        // Untracked orders untouched.
        assert!(store.issues_for_order("order-1044").await.unwrap().is_empty());
    }

    /// Tracking provider that errors for one reference and reports a delay
    /// for another.
    struct FlakyTracking;

    #[async_trait]
    impl TrackingProvider for FlakyTracking {
        async fn check(&self, tracking_ref: &str) -> std::io::Result<TrackingReport> {
            match tracking_ref {
                "demo-tracking-001" => Err(std::io::Error::other("carrier API down")),
                "demo-tracking-003" => Ok(TrackingReport::delayed(7)),
                _ => Ok(TrackingReport::on_time()),
            }
        }
    }

    #[tokio::test]
    async fn one_faulty_order_does_not_block_the_rest() {
        let store = Arc::new(MemoryGraph::seeded());
        let monitor = monitor_with(store.clone(), Arc::new(FlakyTracking), Duration::from_secs(60));

        monitor.scan_once().await.unwrap();

        // order-1042's tracking failed; order-1044 still got resolved.
        assert!(store.issues_for_order("order-1042").await.unwrap().is_empty());
        assert_eq!(store.issues_for_order("order-1044").await.unwrap().len(), 1);
        assert_eq!(monitor.processed_count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_dedup_state() {
        let store = Arc::new(MemoryGraph::seeded());
        let tracking = Arc::new(MockTracking::new());
        tracking.script("demo-tracking-001", TrackingReport::delayed(4));
        let monitor = monitor_with(store, tracking, Duration::from_secs(60));

        monitor.scan_once().await.unwrap();
        assert_eq!(monitor.processed_count(), 1);
        monitor.reset();
        assert_eq!(monitor.processed_count(), 0);
    }

    #[tokio::test]
    async fn stop_flag_halts_the_loop() {
        let store = Arc::new(MemoryGraph::seeded());
        let monitor = monitor_with(
            store,
            Arc::new(MockTracking::new()),
            Duration::from_millis(5),
        );

        let handle = tokio::spawn(monitor.clone().run());
        tokio::time::sleep(Duration::from_millis(20)).await;
        monitor.stop();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop observed the stop flag")
            .unwrap();
    }

    #[tokio::test]
    async fn store_outage_fails_the_iteration_not_the_loop() {
        let store = Arc::new(MemoryGraph::seeded());
        store.set_available(false);
        let monitor = monitor_with(
            store,
            Arc::new(MockTracking::new()),
            Duration::from_secs(60),
        );

        // scan_once surfaces the error; run() would absorb and publish it.
        assert!(monitor.scan_once().await.is_err());
    }
}
