use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// The job currently holding the slot.
struct Occupant {
    job_id: String,
    since: Instant,
}

/// Admits at most one job at a time.
///
/// Construct one gate per worker and share it via `Arc`; all methods take
/// `&self` and are safe for concurrent use.
pub struct Gate {
    slot: Mutex<Option<Occupant>>,
    ttl: Option<Duration>,
}

impl Gate {
    /// Creates a gate whose slot is held until explicitly released.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ttl: None,
        }
    }

    /// Creates a gate that treats a slot held longer than `ttl` as stale.
    ///
    /// A stale occupant is evicted by the next `try_acquire` — the recovery
    /// path for sessions that died without releasing.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl: Some(ttl),
        }
    }

    /// Occupies the slot with `job_id` if it is empty (or stale) and returns
    /// true. Returns false immediately otherwise — no blocking, no queueing.
    pub fn try_acquire(&self, job_id: &str) -> bool {
        let mut slot = self.slot.lock().unwrap();

        if let Some(occ) = slot.as_ref() {
            let stale = self.ttl.is_some_and(|ttl| occ.since.elapsed() >= ttl);
            if !stale {
                debug!("gate: slot busy, rejecting job {} (active {})", job_id, occ.job_id);
                return false;
            }
            warn!("gate: evicting stale job {} for {}", occ.job_id, job_id);
        }

        *slot = Some(Occupant {
            job_id: job_id.to_string(),
            since: Instant::now(),
        });
        debug!("gate: slot acquired by job {}", job_id);
        true
    }

    /// Clears the slot unconditionally. Idempotent: releasing an empty slot
    /// is a no-op. The job id is recorded for observability only — a release
    /// for a job other than the occupant still clears the slot.
    pub fn release(&self, job_id: &str) {
        let mut slot = self.slot.lock().unwrap();
        match slot.take() {
            Some(occ) if occ.job_id != job_id => {
                warn!("gate: released by job {} while held by {}", job_id, occ.job_id);
            }
            Some(occ) => debug!("gate: slot released by job {}", occ.job_id),
            None => {}
        }
    }

    /// Scoped acquisition: on success the returned lease releases the slot
    /// when dropped, covering normal completion, errors, and cancellation.
    pub fn lease(self: &Arc<Self>, job_id: &str) -> Option<SlotLease> {
        if !self.try_acquire(job_id) {
            return None;
        }
        Some(SlotLease {
            gate: Arc::clone(self),
            job_id: job_id.to_string(),
        })
    }

    /// Returns the id of the job currently holding the slot.
    pub fn occupant(&self) -> Option<String> {
        let slot = self.slot.lock().unwrap();
        slot.as_ref().map(|occ| occ.job_id.clone())
    }

    /// Returns true if the slot is empty.
    pub fn is_idle(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the gate's slot for the lifetime of a session.
///
/// Dropping the lease releases the slot. Must not outlive the session it
/// guards.
pub struct SlotLease {
    gate: Arc<Gate>,
    job_id: String,
}

impl SlotLease {
    /// Returns the id of the job this lease was acquired for.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        self.gate.release(&self.job_id);
    }
}
