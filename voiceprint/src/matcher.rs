use std::sync::Arc;

use tracing::{debug, info};

use crate::similarity::cosine_similarity;
use crate::store::PrintStore;
use crate::wav;
use crate::{Encoder, VoiceprintError};

/// Minimum confidence for a positive match. Fixed, not configurable.
pub const MATCH_THRESHOLD: f32 = 0.7;

/// Outcome of a match request.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The compared (targeted) or best-matching (untargeted) speaker.
    pub speaker_id: String,

    /// Cosine similarity to that speaker's stored voiceprint.
    pub confidence: f32,

    /// True iff `confidence >= MATCH_THRESHOLD`.
    pub is_match: bool,
}

/// Enrolls and matches speakers against a store of voiceprints.
///
/// Both operations are stateless single-shot request/response calls; the
/// matcher holds no session state between them.
pub struct Matcher {
    encoder: Arc<dyn Encoder>,
    store: Arc<dyn PrintStore>,
}

impl Matcher {
    pub fn new(encoder: Arc<dyn Encoder>, store: Arc<dyn PrintStore>) -> Self {
        Self { encoder, store }
    }

    /// Decodes `audio`, computes its embedding, and stores it under
    /// `speaker_id`, replacing any prior voiceprint wholesale.
    pub async fn enroll(&self, speaker_id: &str, audio: &[u8]) -> Result<(), VoiceprintError> {
        let pcm = wav::decode(audio)?;
        let print = self.encoder.encode(&pcm).await?;
        self.enroll_print(speaker_id, &print)?;
        info!("voiceprint: enrolled speaker {speaker_id} ({} samples)", pcm.len());
        Ok(())
    }

    /// Stores an already-computed embedding under `speaker_id`.
    pub fn enroll_print(&self, speaker_id: &str, print: &[f32]) -> Result<(), VoiceprintError> {
        self.store.put(speaker_id, print)
    }

    /// Decodes `audio`, computes its embedding, and matches it against the
    /// store. See [`Matcher::match_print`] for the matching semantics.
    pub async fn match_audio(
        &self,
        audio: &[u8],
        target: Option<&str>,
    ) -> Result<MatchResult, VoiceprintError> {
        let pcm = wav::decode(audio)?;
        let print = self.encoder.encode(&pcm).await?;
        self.match_print(&print, target)
    }

    /// Matches an embedding against the store.
    ///
    /// Targeted (`target` given): similarity against that speaker's single
    /// stored voiceprint; a speaker with no stored print scores 0.0 — not an
    /// error. Untargeted: the maximum-similarity speaker across the whole
    /// store; an empty store is `NotFound`. Ties resolve to the
    /// lexicographically smallest speaker id (the store lists in id order
    /// and only a strictly higher score displaces the current best).
    pub fn match_print(
        &self,
        print: &[f32],
        target: Option<&str>,
    ) -> Result<MatchResult, VoiceprintError> {
        match target {
            Some(speaker_id) => {
                let confidence = match self.store.get(speaker_id)? {
                    Some(stored) => cosine_similarity(print, &stored),
                    None => 0.0,
                };
                debug!("voiceprint: targeted match {speaker_id} -> {confidence:.3}");
                Ok(result(speaker_id.to_string(), confidence))
            }
            None => {
                let prints = self.store.list()?;
                if prints.is_empty() {
                    return Err(VoiceprintError::NotFound);
                }

                let mut best_id: Option<String> = None;
                let mut best_conf = f32::NEG_INFINITY;
                for (speaker_id, stored) in prints {
                    let conf = cosine_similarity(print, &stored);
                    if conf > best_conf {
                        best_conf = conf;
                        best_id = Some(speaker_id);
                    }
                }

                let speaker_id = best_id.expect("non-empty store yields a best match");
                debug!("voiceprint: scan match -> {speaker_id} ({best_conf:.3})");
                Ok(result(speaker_id, best_conf))
            }
        }
    }

    /// Returns the number of stored voiceprints.
    pub fn stored(&self) -> Result<usize, VoiceprintError> {
        self.store.len()
    }
}

fn result(speaker_id: String, confidence: f32) -> MatchResult {
    MatchResult {
        speaker_id,
        confidence,
        is_match: confidence >= MATCH_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::wav::PcmAudio;

    /// Maps each distinct audio payload to a fixed embedding, no model
    /// involved.
    struct StubEncoder;

    #[async_trait::async_trait]
    impl Encoder for StubEncoder {
        async fn encode(&self, audio: &PcmAudio) -> Result<Vec<f32>, VoiceprintError> {
            // First sample picks an axis-aligned unit vector.
            let s = i16::from_le_bytes([audio.data[0], audio.data[1]]);
            let mut v = vec![0.0; 3];
            v[(s as usize) % 3] = 1.0;
            Ok(v)
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(StubEncoder), Arc::new(MemoryStore::new()))
    }

    fn wav_with_first_sample(s: i16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&16000u32.to_le_bytes());
        out.extend_from_slice(&32000u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&4u32.to_le_bytes());
        out.extend_from_slice(&s.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes());
        out
    }

    #[test]
    fn targeted_match_identical_print() {
        let m = matcher();
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();

        let r = m.match_print(&[1.0, 0.0, 0.0], Some("alice")).unwrap();
        assert_eq!(r.speaker_id, "alice");
        assert!((r.confidence - 1.0).abs() < 1e-6);
        assert!(r.is_match);
    }

    #[test]
    fn targeted_match_missing_speaker_scores_zero() {
        let m = matcher();
        let r = m.match_print(&[1.0, 0.0, 0.0], Some("nobody")).unwrap();
        assert_eq!(r.speaker_id, "nobody");
        assert_eq!(r.confidence, 0.0);
        assert!(!r.is_match);
    }

    #[test]
    fn orthogonal_print_is_no_match() {
        let m = matcher();
        m.enroll_print("bob", &[0.0, 1.0, 0.0]).unwrap();

        let r = m.match_print(&[1.0, 0.0, 0.0], None).unwrap();
        assert_eq!(r.speaker_id, "bob");
        assert!(r.confidence.abs() < 1e-6);
        assert!(!r.is_match);
    }

    #[test]
    fn scan_match_empty_store_is_not_found() {
        let m = matcher();
        let err = m.match_print(&[1.0, 0.0, 0.0], None).unwrap_err();
        assert!(matches!(err, VoiceprintError::NotFound));
    }

    #[test]
    fn scan_match_picks_best_speaker() {
        let m = matcher();
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();
        m.enroll_print("bob", &[0.0, 1.0, 0.0]).unwrap();
        m.enroll_print("carol", &[0.7, 0.7, 0.0]).unwrap();

        let r = m.match_print(&[1.0, 0.0, 0.0], None).unwrap();
        assert_eq!(r.speaker_id, "alice");
        assert!(r.is_match);
    }

    #[test]
    fn scan_match_tie_resolves_to_smallest_id() {
        let m = matcher();
        // Enrollment order must not matter; the id order must.
        m.enroll_print("zoe", &[1.0, 0.0, 0.0]).unwrap();
        m.enroll_print("amy", &[1.0, 0.0, 0.0]).unwrap();
        m.enroll_print("mia", &[1.0, 0.0, 0.0]).unwrap();

        let r = m.match_print(&[1.0, 0.0, 0.0], None).unwrap();
        assert_eq!(r.speaker_id, "amy");
    }

    #[test]
    fn reenroll_replaces_prior_print() {
        let m = matcher();
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();
        m.enroll_print("alice", &[0.0, 0.0, 1.0]).unwrap();

        // Only the latest vector counts.
        let stale = m.match_print(&[1.0, 0.0, 0.0], Some("alice")).unwrap();
        assert!(!stale.is_match);

        let fresh = m.match_print(&[0.0, 0.0, 1.0], Some("alice")).unwrap();
        assert!((fresh.confidence - 1.0).abs() < 1e-6);
        assert!(fresh.is_match);
    }

    #[test]
    fn threshold_is_inclusive() {
        let m = matcher();
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();

        // cos = 0.6 < threshold.
        let low = m.match_print(&[0.6, 0.8, 0.0], Some("alice")).unwrap();
        assert!(!low.is_match);

        // cos exactly 1.0 >= threshold.
        let exact = m.match_print(&[2.0, 0.0, 0.0], Some("alice")).unwrap();
        assert!(exact.is_match);
    }

    #[tokio::test]
    async fn enroll_and_match_through_audio_path() {
        let m = matcher();
        m.enroll("alice", &wav_with_first_sample(0)).await.unwrap();

        let r = m
            .match_audio(&wav_with_first_sample(0), Some("alice"))
            .await
            .unwrap();
        assert!(r.is_match);

        let other = m
            .match_audio(&wav_with_first_sample(1), Some("alice"))
            .await
            .unwrap();
        assert!(!other.is_match);
    }

    #[tokio::test]
    async fn enroll_bad_audio_is_decode_error() {
        let m = matcher();
        let err = m.enroll("alice", b"definitely not a wav").await.unwrap_err();
        assert!(matches!(err, VoiceprintError::Decode(_)));
        assert_eq!(m.stored().unwrap(), 0);
    }

    #[tokio::test]
    async fn match_bad_audio_is_decode_error() {
        let m = matcher();
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();
        let err = m.match_audio(b"\x00\x01", None).await.unwrap_err();
        assert!(matches!(err, VoiceprintError::Decode(_)));
    }

    #[test]
    fn stored_counts_prints() {
        let m = matcher();
        assert_eq!(m.stored().unwrap(), 0);
        m.enroll_print("alice", &[1.0, 0.0, 0.0]).unwrap();
        m.enroll_print("bob", &[0.0, 1.0, 0.0]).unwrap();
        m.enroll_print("alice", &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(m.stored().unwrap(), 2);
    }
}
