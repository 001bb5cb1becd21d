//! Single-slot job admission gate.
//!
//! At most one agent session may be active at a time. Arriving jobs call
//! [`Gate::try_acquire`] (or the scoped [`Gate::lease`]) and get an immediate
//! accept/reject decision — rejected jobs are not queued, and the gate never
//! retries on a caller's behalf.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use scribegear_gate::Gate;
//!
//! let gate = Arc::new(Gate::new());
//!
//! // Scoped form: the slot is released when the lease drops,
//! // on every exit path.
//! if let Some(lease) = gate.lease("job-1") {
//!     assert!(!gate.try_acquire("job-2"));
//!     drop(lease);
//! }
//! assert!(gate.is_idle());
//! ```
//!
//! # Design
//!
//! The internal lock is held only for the check-and-set instant, never for
//! the duration of the guarded session, and no I/O happens under it. The
//! gate raises no errors: every input resolves to accept, reject, or a
//! no-op release.

mod gate;

pub use gate::{Gate, SlotLease};
