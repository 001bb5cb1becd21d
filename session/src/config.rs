//! Mode table loading from YAML or JSON files.
//!
//! File shape:
//!
//! ```yaml
//! default_mode: braindump
//! modes:
//!   braindump:
//!     instructions: "You are ..."
//!   interview:
//!     instructions: "You are ..."
//!     requires_consent: true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SessionError;
use crate::profile::{ModeProfile, ModeTable, DEFAULT_MODE};

/// On-disk table file shape. `default_mode` falls back to the built-in
/// baseline when omitted.
#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default = "default_mode_label")]
    default_mode: String,
    modes: BTreeMap<String, ModeProfile>,
}

fn default_mode_label() -> String {
    DEFAULT_MODE.to_string()
}

/// Loads a mode table from a YAML or JSON file, switched on extension.
///
/// The loaded table must contain a profile for its own default mode.
pub fn load_table(path: &Path) -> Result<ModeTable, SessionError> {
    let data = std::fs::read_to_string(path).map_err(|e| SessionError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file: TableFile = match ext.as_str() {
        "json" => serde_json::from_str(&data).map_err(|e| SessionError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?,
        "yaml" | "yml" => serde_yaml::from_str(&data).map_err(|e| SessionError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?,
        _ => return Err(SessionError::UnsupportedExtension(ext)),
    };

    ModeTable::new(file.default_mode, file.modes)
}
