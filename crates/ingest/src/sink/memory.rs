//! In-memory sink.

use async_trait::async_trait;
use folio_core::SinkError;
use tokio::sync::Mutex;

use super::{unit_digest, StorageSink, UnitHandle};
use crate::types::IngestedUnit;

type RejectFn = Box<dyn Fn(&IngestedUnit) -> bool + Send + Sync>;

/// Collects units in memory, optionally refusing some of them.
#[derive(Default)]
pub struct MemorySink {
    units: Mutex<Vec<IngestedUnit>>,
    reject: Option<RejectFn>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every unit matching `predicate`.
    pub fn rejecting(predicate: impl Fn(&IngestedUnit) -> bool + Send + Sync + 'static) -> Self {
        Self {
            units: Mutex::new(Vec::new()),
            reject: Some(Box::new(predicate)),
        }
    }

    /// Stored units in arrival order.
    pub async fn units(&self) -> Vec<IngestedUnit> {
        self.units.lock().await.clone()
    }
}

#[async_trait]
impl StorageSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn store(&self, unit: IngestedUnit) -> Result<UnitHandle, SinkError> {
        if self.reject.as_ref().is_some_and(|reject| reject(&unit)) {
            return Err(SinkError::Rejected(format!(
                "unit {:?} refused",
                unit.chunk_index()
            )));
        }

        let handle = unit_digest(&unit);
        self.units.lock().await.push(unit);
        Ok(handle)
    }
}
