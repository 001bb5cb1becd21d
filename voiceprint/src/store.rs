use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::VoiceprintError;

/// Persists one voiceprint vector per speaker id.
///
/// Implementations must be safe for concurrent use. `put` replaces any
/// existing vector wholesale; `list` returns entries sorted by speaker id so
/// iteration order — and therefore match tie-breaking — is deterministic.
pub trait PrintStore: Send + Sync {
    /// Returns the stored voiceprint for a speaker, or None.
    fn get(&self, speaker_id: &str) -> Result<Option<Vec<f32>>, VoiceprintError>;

    /// Stores a voiceprint, replacing any prior vector for this speaker.
    fn put(&self, speaker_id: &str, print: &[f32]) -> Result<(), VoiceprintError>;

    /// Returns all stored (speaker id, voiceprint) pairs, sorted by id.
    fn list(&self) -> Result<Vec<(String, Vec<f32>)>, VoiceprintError>;

    /// Returns the count of stored voiceprints.
    fn len(&self) -> Result<usize, VoiceprintError>;
}

/// In-memory [`PrintStore`] implementation.
/// Data is lost on restart. Suitable for testing or ephemeral use.
pub struct MemoryStore {
    data: Mutex<HashMap<String, Vec<f32>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintStore for MemoryStore {
    fn get(&self, speaker_id: &str) -> Result<Option<Vec<f32>>, VoiceprintError> {
        let data = self.data.lock().unwrap();
        Ok(data.get(speaker_id).cloned())
    }

    fn put(&self, speaker_id: &str, print: &[f32]) -> Result<(), VoiceprintError> {
        let mut data = self.data.lock().unwrap();
        data.insert(speaker_id.to_string(), print.to_vec());
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, Vec<f32>)>, VoiceprintError> {
        let data = self.data.lock().unwrap();
        let mut entries: Vec<(String, Vec<f32>)> = data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn len(&self) -> Result<usize, VoiceprintError> {
        Ok(self.data.lock().unwrap().len())
    }
}

/// Filesystem-backed [`PrintStore`]: one `<speaker_id>.json` per speaker
/// under a root directory.
///
/// Vectors are stored as JSON arrays; serde_json emits shortest
/// round-trip float literals, so f32 values survive a write/read cycle
/// exactly. Concurrent writes to the same speaker are last-write-wins.
pub struct DirStore {
    root: PathBuf,
}

const PRINT_EXT: &str = "json";

impl DirStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VoiceprintError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| VoiceprintError::Storage(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    /// Returns the store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, speaker_id: &str) -> Result<PathBuf, VoiceprintError> {
        if !valid_id(speaker_id) {
            return Err(VoiceprintError::Storage(format!(
                "invalid speaker id {speaker_id:?}"
            )));
        }
        Ok(self.root.join(format!("{speaker_id}.{PRINT_EXT}")))
    }
}

/// Ids become file names, so restrict them to characters that cannot
/// escape the root directory.
fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

impl PrintStore for DirStore {
    fn get(&self, speaker_id: &str) -> Result<Option<Vec<f32>>, VoiceprintError> {
        let path = self.path_for(speaker_id)?;
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(VoiceprintError::Storage(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };
        let print: Vec<f32> = serde_json::from_slice(&data)
            .map_err(|e| VoiceprintError::Storage(format!("parse {}: {e}", path.display())))?;
        Ok(Some(print))
    }

    fn put(&self, speaker_id: &str, print: &[f32]) -> Result<(), VoiceprintError> {
        let path = self.path_for(speaker_id)?;
        let data = serde_json::to_vec(print)
            .map_err(|e| VoiceprintError::Storage(format!("serialize {speaker_id}: {e}")))?;
        std::fs::write(&path, data)
            .map_err(|e| VoiceprintError::Storage(format!("write {}: {e}", path.display())))
    }

    fn list(&self) -> Result<Vec<(String, Vec<f32>)>, VoiceprintError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            VoiceprintError::Storage(format!("read dir {}: {e}", self.root.display()))
        })?;

        let mut prints = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| VoiceprintError::Storage(format!("dir entry: {e}")))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PRINT_EXT) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Foreign files whose stem is not a usable id are not prints.
            if !valid_id(id) {
                continue;
            }
            if let Some(print) = self.get(id)? {
                prints.push((id.to_string(), print));
            }
        }
        prints.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(prints)
    }

    fn len(&self) -> Result<usize, VoiceprintError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            VoiceprintError::Storage(format!("read dir {}: {e}", self.root.display()))
        })?;
        let mut count = 0;
        for entry in entries {
            let entry =
                entry.map_err(|e| VoiceprintError::Storage(format!("dir entry: {e}")))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PRINT_EXT) {
                continue;
            }
            if path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(valid_id)
            {
                count += 1;
            }
        }
        Ok(count)
    }
}
