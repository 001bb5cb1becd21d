//! Mode-driven session profile resolution.
//!
//! A session's behavior is picked by the `mode` field of the room metadata
//! blob attached to the job. [`ModeTable::resolve`] maps that blob to a
//! [`ModeProfile`] (instructions text + consent requirement) and never
//! fails: a missing blob, malformed JSON, or an unrecognized mode all fall
//! back to the baseline mode.
//!
//! Profiles that require consent must speak [`CONSENT_ANNOUNCEMENT`]
//! verbatim, in full, before any other agent speech — [`opening_line`]
//! returns the session's first utterance either way.
//!
//! The mode set is a table, not code: [`ModeTable::builtin`] ships the
//! default five modes, and [`load_table`] reads a deployment-specific table
//! from a YAML or JSON file.

mod config;
mod error;
mod profile;

pub use config::load_table;
pub use error::SessionError;
pub use profile::{opening_line, ModeProfile, ModeTable, CONSENT_ANNOUNCEMENT, DEFAULT_MODE};
