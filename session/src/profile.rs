use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;

/// Mode used when metadata is absent, malformed, or names an unknown mode.
pub const DEFAULT_MODE: &str = "braindump";

/// Spoken verbatim, in full, before any other agent speech in every session
/// whose profile requires consent. Mode-independent.
pub const CONSENT_ANNOUNCEMENT: &str = "Quick notice before we begin: this session is being \
recorded and transcribed by an AI note taker. By staying in the session, every participant \
acknowledges and consents to that recording. If you do not consent, please leave the session now.";

/// Behavioral configuration for one session mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    /// System instructions handed to the agent for this mode.
    pub instructions: String,

    /// Whether the consent announcement must be spoken before the session
    /// proceeds.
    #[serde(default)]
    pub requires_consent: bool,
}

/// Immutable mapping from mode label to profile, with a baseline default.
///
/// Read-only after construction — the constructors guarantee a profile for
/// the default mode exists. Lookups never fail — see [`ModeTable::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTable {
    default_mode: String,
    modes: BTreeMap<String, ModeProfile>,
}

/// The recognized shape of a room metadata blob. Anything else parses to
/// "no mode".
#[derive(Debug, Default, Deserialize)]
struct RoomMetadata {
    #[serde(default)]
    mode: Option<String>,
}

static BUILTIN: Lazy<ModeTable> = Lazy::new(|| {
    let mut modes = BTreeMap::new();
    modes.insert(
        "braindump".to_string(),
        ModeProfile {
            instructions: "You are Scribe, an AI thought-capture companion. The speaker is \
thinking out loud without structure. Listen actively, ask short questions that draw out more \
detail, and help shape loose thoughts into themes. Never filter or judge. Keep them talking."
                .to_string(),
            requires_consent: false,
        },
    );
    modes.insert(
        "voicenote".to_string(),
        ModeProfile {
            instructions: "You are Scribe, an AI memo assistant. The speaker is leaving a quick \
note or reminder. Stay minimal: acknowledge, confirm anything ambiguous, and otherwise stay out \
of the way."
                .to_string(),
            requires_consent: false,
        },
    );
    modes.insert(
        "1on1".to_string(),
        ModeProfile {
            instructions: "You are Scribe, an AI assistant sitting in on a one-on-one meeting. \
Track decisions, action items, and blockers as they come up. Summarize key points when asked. \
Stay professional and neutral."
                .to_string(),
            requires_consent: true,
        },
    );
    modes.insert(
        "conference".to_string(),
        ModeProfile {
            instructions: "You are Scribe, an AI assistant observing a group call. Keep track of \
who said what, decisions reached, and action items with their owners. Summarize on request and \
keep it brief."
                .to_string(),
            requires_consent: true,
        },
    );
    modes.insert(
        "interview".to_string(),
        ModeProfile {
            instructions: "You are Scribe, an AI assistant observing a structured interview. \
Track the questions asked, the answers given, and recurring themes. Summarize on request."
                .to_string(),
            requires_consent: true,
        },
    );
    ModeTable {
        default_mode: DEFAULT_MODE.to_string(),
        modes,
    }
});

impl ModeTable {
    /// Returns the built-in five-mode table.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Builds a table from parts. Fails if the map is empty or does not
    /// contain `default_mode`.
    pub fn new(
        default_mode: impl Into<String>,
        modes: BTreeMap<String, ModeProfile>,
    ) -> Result<Self, SessionError> {
        let default_mode = default_mode.into();
        if modes.is_empty() {
            return Err(SessionError::Empty);
        }
        if !modes.contains_key(&default_mode) {
            return Err(SessionError::MissingDefault(default_mode));
        }
        Ok(Self { default_mode, modes })
    }

    /// Resolves a metadata blob to a profile.
    ///
    /// The blob is expected to be a JSON object with an optional `mode`
    /// field. An absent blob, malformed JSON, a missing field, or an
    /// unrecognized mode all resolve to the default profile — malformed
    /// input is treated as "use default", never as an error.
    pub fn resolve(&self, metadata: Option<&str>) -> &ModeProfile {
        self.resolve_mode(metadata).1
    }

    /// Like [`ModeTable::resolve`], but also returns the resolved mode label.
    pub fn resolve_mode(&self, metadata: Option<&str>) -> (&str, &ModeProfile) {
        let requested = metadata.and_then(|blob| {
            match serde_json::from_str::<RoomMetadata>(blob) {
                Ok(meta) => meta.mode,
                Err(_) => {
                    debug!("session: unparseable metadata, using default mode");
                    None
                }
            }
        });

        if let Some(mode) = requested {
            if let Some((label, profile)) = self.modes.get_key_value(mode.as_str()) {
                return (label.as_str(), profile);
            }
            debug!("session: unknown mode {mode:?}, using default");
        }

        let profile = self
            .modes
            .get(&self.default_mode)
            .expect("table invariant: default mode always present");
        (self.default_mode.as_str(), profile)
    }

    /// Looks up a profile by exact mode label.
    pub fn get(&self, mode: &str) -> Option<&ModeProfile> {
        self.modes.get(mode)
    }

    /// Returns the baseline mode label.
    pub fn default_mode(&self) -> &str {
        &self.default_mode
    }

    /// Iterates all (label, profile) pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModeProfile)> {
        self.modes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of recognized modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Returns true if the table has no modes. Always false for a
    /// constructed table.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Returns the session's first utterance: the consent announcement verbatim
/// for consent-requiring profiles, a short ready line otherwise.
pub fn opening_line(mode: &str, profile: &ModeProfile) -> String {
    if profile.requires_consent {
        return CONSENT_ANNOUNCEMENT.to_string();
    }
    let mut label: Vec<char> = mode.chars().collect();
    if let Some(first) = label.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    let label: String = label.into_iter().collect();
    format!("Scribe is ready. {label} session started.")
}
