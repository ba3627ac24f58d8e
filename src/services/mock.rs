//! In-memory stand-ins for the external services, used by tests and local runs

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::services::object_store::ObjectStore;
use crate::services::paypal::{CaptureOutcome, PaymentProcessor, ProcessorOrder};

pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self { objects: Mutex::new(HashMap::new()) }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().map(|o| o.contains_key(key)).unwrap_or(false)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().map(|o| o.keys().cloned().collect()).unwrap_or_default()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload_object(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        let mut objects = self.objects.lock().map_err(|_| anyhow!("object map poisoned"))?;
        objects.insert(key.to_string(), data);
        Ok(format!("memory://{}", key))
    }
}

/// Payment processor with scripted capture results
pub struct MockPaymentProcessor {
    captures: Mutex<HashMap<String, CaptureOutcome>>,
    next_order: Mutex<u64>,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self {
            captures: Mutex::new(HashMap::new()),
            next_order: Mutex::new(1),
        }
    }

    /// Outcome returned when `order_id` is captured
    pub fn set_capture(&self, order_id: &str, outcome: CaptureOutcome) {
        if let Ok(mut captures) = self.captures.lock() {
            captures.insert(order_id.to_string(), outcome);
        }
    }
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_order(&self, amount: Decimal) -> Result<ProcessorOrder> {
        let mut next = self.next_order.lock().map_err(|_| anyhow!("order counter poisoned"))?;
        let id = format!("MOCK-ORDER-{}", *next);
        *next += 1;
        log::debug!("[mock] create_order({}) -> {}", amount, id);
        Ok(ProcessorOrder { id, status: "CREATED".to_string() })
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome> {
        log::debug!("[mock] capture_order({})", order_id);
        let captures = self.captures.lock().map_err(|_| anyhow!("capture map poisoned"))?;
        captures
            .get(order_id)
            .cloned()
            .ok_or_else(|| anyhow!("order {} not found", order_id))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_capture() {
        let mock = MockPaymentProcessor::new();
        let order = mock.create_order(Decimal::from(5)).await.unwrap();
        assert!(mock.capture_order(&order.id).await.is_err());

        mock.set_capture(&order.id, CaptureOutcome::Completed { settled_amount: Decimal::from(5) });
        assert_eq!(
            mock.capture_order(&order.id).await.unwrap(),
            CaptureOutcome::Completed { settled_amount: Decimal::from(5) }
        );
    }
}
