//! The lead store collaborator: where leads come from and where status
//! changes are persisted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use funnel_core::types::{Lead, LeadId, StageKey};
use tokio::sync::{RwLock, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("lead not found: {0}")]
    NotFound(LeadId),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// Human-readable reason shown to the operator.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Every lead the board should show. Authoritative at load time.
    async fn list(&self) -> Result<Vec<Lead>, StoreError>;

    /// Set `id`'s status to `target`. Repeating a call with the same
    /// arguments must leave the store in the same state.
    async fn persist_status(&self, id: &LeadId, target: &StageKey) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// InMemoryLeadStore
// ---------------------------------------------------------------------------

/// A lead store backed by a `Vec`, with hooks to inject failures and to hold
/// persistence calls open until released.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<Vec<Lead>>,
    failures: Mutex<Failures>,
    gate: Option<Semaphore>,
    calls: Mutex<Vec<(LeadId, StageKey)>>,
}

#[derive(Debug, Default)]
struct Failures {
    always: HashMap<LeadId, String>,
    once: HashMap<LeadId, Vec<String>>,
}

impl InMemoryLeadStore {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self {
            leads: RwLock::new(leads),
            ..Self::default()
        }
    }

    /// Persistence calls wait until [`release`](Self::release) hands out a permit.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let `n` held persistence calls proceed, in arrival order.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Every persist for `id` fails with `reason` until cleared.
    pub fn fail_always(&self, id: impl Into<LeadId>, reason: impl Into<String>) {
        self.failures_mut().always.insert(id.into(), reason.into());
    }

    /// The next persist for `id` fails with `reason`.
    pub fn fail_next(&self, id: impl Into<LeadId>, reason: impl Into<String>) {
        self.failures_mut()
            .once
            .entry(id.into())
            .or_default()
            .push(reason.into());
    }

    pub fn clear_failures(&self) {
        let mut failures = self.failures_mut();
        failures.always.clear();
        failures.once.clear();
    }

    /// Persistence calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<(LeadId, StageKey)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub async fn snapshot(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }

    pub async fn insert(&self, lead: Lead) {
        self.leads.write().await.push(lead);
    }

    pub async fn remove(&self, id: &LeadId) -> Option<Lead> {
        let mut leads = self.leads.write().await;
        let idx = leads.iter().position(|l| &l.id == id)?;
        Some(leads.remove(idx))
    }

    fn failures_mut(&self) -> std::sync::MutexGuard<'_, Failures> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_failure(&self, id: &LeadId) -> Option<String> {
        let mut failures = self.failures_mut();
        if let Some(reason) = failures.always.get(id) {
            return Some(reason.clone());
        }
        let queue = failures.once.get_mut(id)?;
        if queue.is_empty() {
            return None;
        }
        Some(queue.remove(0))
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn list(&self) -> Result<Vec<Lead>, StoreError> {
        Ok(self.leads.read().await.clone())
    }

    async fn persist_status(&self, id: &LeadId, target: &StageKey) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id.clone(), target.clone()));
        // Decide the outcome on arrival so call order, not wake-up order, picks
        // which call consumes a one-shot failure.
        let failure = self.take_failure(id);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?
                .forget();
        }

        if let Some(reason) = failure {
            return Err(StoreError::Rejected(reason));
        }

        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        lead.status = target.clone();
        Ok(())
    }
}
