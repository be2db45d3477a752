use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::models::team::TeamId;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FairnessEvent {
    #[serde(rename_all = "camelCase")]
    AdaptiveFallbackApplied { team_id: TeamId, series_len: usize },
}

/// Side channel for operational diagnostics raised by the scoring core.
pub trait FairnessEventSink: Send + Sync {
    fn emit(&self, event: FairnessEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl FairnessEventSink for TracingEventSink {
    fn emit(&self, event: FairnessEvent) {
        match event {
            FairnessEvent::AdaptiveFallbackApplied {
                team_id,
                series_len,
            } => {
                info!(
                    target: "app::fairness",
                    team_id,
                    series_len,
                    "no slot satisfies team preferences, treating team as unconstrained"
                );
            }
        }
    }
}

/// Keeps every event in memory; used by tests and report tooling.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<FairnessEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FairnessEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FairnessEventSink for MemoryEventSink {
    fn emit(&self, event: FairnessEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
