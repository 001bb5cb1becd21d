use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use scribegear_gate::{Gate, SlotLease};
use scribegear_session::{opening_line, ModeProfile, ModeTable};

/// An arriving job: an id plus the opaque room context it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub id: String,

    /// Room or session name the job was dispatched for.
    pub room: String,

    /// Opaque room metadata blob; its optional `mode` field picks the
    /// session profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// Everything an accepted session starts with.
///
/// Holds the slot lease: the admission slot is released when the plan is
/// dropped, on every exit path of the session.
pub struct SessionPlan {
    lease: SlotLease,

    /// Resolved mode label.
    pub mode: String,

    /// Resolved behavioral profile.
    pub profile: ModeProfile,

    /// The session's first utterance. For consent-requiring profiles this
    /// is the consent announcement, verbatim and in full, and must be
    /// spoken before any other agent speech.
    pub opening: String,
}

impl SessionPlan {
    /// Returns the id of the admitted job.
    pub fn job_id(&self) -> &str {
        self.lease.job_id()
    }
}

/// Outcome of an admission attempt.
pub enum Admission {
    /// The job holds the slot; run the session from this plan.
    Accepted(Box<SessionPlan>),

    /// Another job holds the slot. The caller may retry or give up; the
    /// dispatcher does neither.
    Busy {
        /// Id of the occupying job, when it could be observed.
        active: Option<String>,
    },
}

/// Synchronous accept/reject decision point for arriving jobs.
pub struct Dispatcher {
    gate: Arc<Gate>,
    modes: ModeTable,
}

impl Dispatcher {
    pub fn new(gate: Arc<Gate>, modes: ModeTable) -> Self {
        Self { gate, modes }
    }

    /// Decides admission for one job.
    ///
    /// Non-blocking: either the gate's slot is taken for this job and a
    /// full session plan comes back, or the job is rejected immediately.
    pub fn admit(&self, job: &JobRequest) -> Admission {
        let Some(lease) = self.gate.lease(&job.id) else {
            let active = self.gate.occupant();
            info!("agent: job {} rejected, slot busy", job.id);
            return Admission::Busy { active };
        };

        let (mode, profile) = self.modes.resolve_mode(job.metadata.as_deref());
        info!("agent: job {} accepted | room={} mode={}", job.id, job.room, mode);

        Admission::Accepted(Box::new(SessionPlan {
            lease,
            mode: mode.to_string(),
            profile: profile.clone(),
            opening: opening_line(mode, profile),
        }))
    }
}
