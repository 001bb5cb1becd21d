//! Job acceptance for voice agent sessions.
//!
//! When a job arrives, the worker must decide accept or reject
//! synchronously — that decision is the only externally visible action.
//! [`Dispatcher::admit`] tries the single-slot gate and, on success,
//! resolves the session's mode profile and opening speech into a
//! [`SessionPlan`]. The plan carries the slot lease: dropping the plan
//! releases the slot, however the session ended.

mod dispatch;

pub use dispatch::{Admission, Dispatcher, JobRequest, SessionPlan};
