//! Domain events raised when a record reaches a terminal state.
//!
//! Services publish through an `EventSink` without waiting for delivery; the
//! `EventDispatcher` task drains the channel and hands each event to the
//! registered listeners, retrying failed deliveries with a linear backoff.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const FUNDING_WAS_COMPLETED: &str = "FundingWasCompleted";
pub const WITHDRAWAL_WAS_COMPLETED: &str = "WithdrawalWasCompleted";
pub const PAYMENT_WAS_SUCCESSFUL: &str = "PaymentWasSuccessful";
pub const INVESTMENT_WAS_COMPLETED: &str = "InvestmentWasCompleted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub kind: String,
    pub module: String,
    pub entity_id: Uuid,
    /// Record state at the moment of the transition.
    pub snapshot: Value,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(kind: &str, module: &str, entity_id: Uuid, snapshot: &impl Serialize) -> Self {
        let snapshot = serde_json::to_value(snapshot).unwrap_or_else(|e| {
            warn!(kind, module, entity_id = %entity_id, error = %e, "event_snapshot_unserializable");
            Value::Null
        });
        Self {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            module: module.to_string(),
            entity_id,
            snapshot,
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Fire-and-forget publication point used by services.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: DomainEvent) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait EventListener: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, _event: &DomainEvent) -> bool { true }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()>;
}

/// Sending half of the event channel.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventSink for EventBus {
    fn publish(&self, event: DomainEvent) -> Result<(), ServiceError> {
        self.tx
            .send(event)
            .map_err(|e| ServiceError::Internal(format!("event channel closed, dropped {}", e.0.kind)))
    }
}

pub struct EventDispatcher {
    rx: mpsc::UnboundedReceiver<DomainEvent>,
    listeners: Vec<Arc<dyn EventListener>>,
    max_attempts: u32,
    backoff: Duration,
}

/// Create a connected bus and dispatcher. `max_attempts` counts the first try.
pub fn event_channel(max_attempts: u32, backoff: Duration) -> (EventBus, EventDispatcher) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = EventDispatcher { rx, listeners: Vec::new(), max_attempts: max_attempts.max(1), backoff };
    (EventBus { tx }, dispatcher)
}

impl EventDispatcher {
    pub fn register(&mut self, listener: Arc<dyn EventListener>) { self.listeners.push(listener); }

    /// Deliver events until every `EventBus` clone is dropped.
    pub async fn run(mut self) {
        info!(listeners = self.listeners.len(), "event_dispatcher_started");
        while let Some(event) = self.rx.recv().await {
            self.deliver(&event).await;
        }
        info!("event_dispatcher_stopped");
    }

    pub async fn deliver(&self, event: &DomainEvent) {
        for listener in self.listeners.iter().filter(|l| l.accepts(event)) {
            let mut attempt = 1;
            loop {
                match listener.handle(event).await {
                    Ok(()) => break,
                    Err(e) if attempt < self.max_attempts => {
                        warn!(listener = listener.name(), kind = %event.kind, attempt, error = %e, "event_delivery_retry");
                        tokio::time::sleep(self.backoff * attempt).await;
                        attempt += 1;
                    }
                    Err(e) => {
                        error!(listener = listener.name(), kind = %event.kind, entity_id = %event.entity_id, attempts = attempt, error = %e, "event_delivery_failed");
                        break;
                    }
                }
            }
        }
    }
}

/// Writes every event to the structured log.
pub struct LogListener;

#[async_trait]
impl EventListener for LogListener {
    fn name(&self) -> &'static str { "log" }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        info!(kind = %event.kind, module = %event.module, entity_id = %event.entity_id, event_id = %event.id, "domain_event");
        Ok(())
    }
}

/// Recording sink and listener for tests
pub mod mock {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<DomainEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<DomainEvent> {
            self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        pub fn kinds(&self) -> Vec<String> { self.events().into_iter().map(|e| e.kind).collect() }
    }

    impl EventSink for RecordingSink {
        fn publish(&self, event: DomainEvent) -> Result<(), ServiceError> {
            self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
            Ok(())
        }
    }

    /// Listener that fails its first `failures` deliveries.
    #[derive(Default)]
    pub struct FlakyListener {
        pub failures: u32,
        calls: Mutex<u32>,
        handled: Mutex<Vec<String>>,
    }

    impl FlakyListener {
        pub fn failing(failures: u32) -> Self { Self { failures, ..Default::default() } }

        pub fn calls(&self) -> u32 { *self.calls.lock().unwrap_or_else(PoisonError::into_inner) }

        pub fn handled(&self) -> Vec<String> { self.handled.lock().unwrap_or_else(PoisonError::into_inner).clone() }
    }

    #[async_trait]
    impl EventListener for FlakyListener {
        fn name(&self) -> &'static str { "flaky" }

        async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
            let call = {
                let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
                *calls += 1;
                *calls
            };
            if call <= self.failures {
                anyhow::bail!("transient failure {}", call);
            }
            self.handled.lock().unwrap_or_else(PoisonError::into_inner).push(event.kind.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{FlakyListener, RecordingSink};
    use super::*;

    fn event() -> DomainEvent {
        DomainEvent::new(FUNDING_WAS_COMPLETED, "funding", Uuid::new_v4(), &serde_json::json!({"status": "completed"}))
            .with_meta("operation", "complete")
    }

    #[test]
    fn unserializable_snapshot_becomes_null() {
        let mut odd = std::collections::HashMap::new();
        odd.insert((1, 2), "tuple keys are not valid JSON object keys");
        let event = DomainEvent::new(FUNDING_WAS_COMPLETED, "funding", Uuid::new_v4(), &odd);
        assert!(event.snapshot.is_null());
        assert_eq!(event.kind, FUNDING_WAS_COMPLETED);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::default();
        sink.publish(event()).unwrap();
        sink.publish(DomainEvent::new(PAYMENT_WAS_SUCCESSFUL, "payment", Uuid::new_v4(), &())).unwrap();
        assert_eq!(sink.kinds(), vec![FUNDING_WAS_COMPLETED.to_string(), PAYMENT_WAS_SUCCESSFUL.to_string()]);
        assert_eq!(sink.events()[0].metadata["operation"], "complete");
    }

    #[tokio::test]
    async fn dispatcher_retries_until_success() {
        let (_bus, mut dispatcher) = event_channel(3, Duration::from_millis(1));
        let listener = Arc::new(FlakyListener::failing(2));
        dispatcher.register(listener.clone());
        dispatcher.deliver(&event()).await;
        assert_eq!(listener.calls(), 3);
        assert_eq!(listener.handled(), vec![FUNDING_WAS_COMPLETED.to_string()]);
    }

    #[tokio::test]
    async fn dispatcher_gives_up_after_max_attempts() {
        let (_bus, mut dispatcher) = event_channel(2, Duration::from_millis(1));
        let listener = Arc::new(FlakyListener::failing(5));
        dispatcher.register(listener.clone());
        dispatcher.deliver(&event()).await;
        assert_eq!(listener.calls(), 2);
        assert!(listener.handled().is_empty());
    }

    #[tokio::test]
    async fn run_drains_the_bus_until_closed() {
        let (bus, mut dispatcher) = event_channel(1, Duration::from_millis(1));
        let listener = Arc::new(FlakyListener::default());
        dispatcher.register(listener.clone());
        let handle = tokio::spawn(dispatcher.run());
        bus.publish(event()).unwrap();
        bus.publish(event()).unwrap();
        drop(bus);
        handle.await.unwrap();
        assert_eq!(listener.handled().len(), 2);
    }
}
