//! Speaker enrollment and matching via embedding cosine similarity.
//!
//! # Architecture
//!
//! The pipeline is three stages, each behind its own seam:
//!
//! 1. [`wav::decode`]: WAV payload -> PCM16 mono audio
//! 2. [`Encoder::encode`]: PCM16 audio -> embedding vector (pretrained model,
//!    reached remotely via [`RemoteEncoder`])
//! 3. [`Matcher`]: embedding vs. stored voiceprints -> best match by
//!    [`cosine_similarity`], accepted at confidence >= [`MATCH_THRESHOLD`]
//!
//! Voiceprints live in a [`PrintStore`] — one vector per speaker id, replaced
//! wholesale on re-enrollment. [`MemoryStore`] backs tests and ephemeral use;
//! [`DirStore`] persists one JSON file per speaker under a root directory.
//!
//! # Determinism
//!
//! `PrintStore::list` returns entries sorted by speaker id, so an untargeted
//! match over equal-confidence prints always resolves to the
//! lexicographically smallest id.
//!
//! Both enroll and match are stateless single-shot operations; concurrent
//! enrollment and matching for the same speaker is last-write-wins.

mod encoder;
mod error;
mod matcher;
mod similarity;
mod store;
pub mod wav;

pub use encoder::{Encoder, RemoteEncoder};
pub use error::VoiceprintError;
pub use matcher::{MatchResult, Matcher, MATCH_THRESHOLD};
pub use similarity::cosine_similarity;
pub use store::{DirStore, MemoryStore, PrintStore};
