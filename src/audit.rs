//! Audit trail for user-visible operations.
//!
//! The sink is an injected collaborator: workflows and middleware receive a
//! `&dyn AuditSink` (or an `Arc` of one) instead of reaching for process-wide
//! state, so each request's audit context stays explicit and tests can
//! capture entries in memory.

use std::sync::Mutex;

/// Records one audit line per user-visible operation outcome.
pub trait AuditSink: Send + Sync {
    fn record(&self, actor: &str, action: &str, detail: &str);
}

/// Production sink: emits audit lines as structured tracing events.
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, actor: &str, action: &str, detail: &str) {
        tracing::info!(target: "docvault::audit", actor, action, detail, "audit");
    }
}

/// One captured audit entry (used by [`MemoryAudit`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor: String,
    pub action: String,
    pub detail: String,
}

/// In-memory sink for unit tests.
#[derive(Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit lock").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, actor: &str, action: &str, detail: &str) {
        self.entries.lock().expect("audit lock").push(AuditEntry {
            actor: actor.to_string(),
            action: action.to_string(),
            detail: detail.to_string(),
        });
    }
}
