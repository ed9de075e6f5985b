// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Persistent viewer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Default zoom used when rendering standalone page images.
    pub scale: f64,
    /// Settings for the Ghostscript rendering backend.
    pub ghostscript: GhostscriptConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            ghostscript: GhostscriptConfig::default(),
        }
    }
}

/// How the Ghostscript backend invokes the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostscriptConfig {
    /// Interpreter executable, looked up on `PATH` when not absolute.
    pub executable: PathBuf,
    /// Text anti-aliasing bits (1, 2 or 4).
    pub text_alpha_bits: u8,
    /// Graphics anti-aliasing bits (1, 2 or 4).
    pub graphics_alpha_bits: u8,
}

impl Default for GhostscriptConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("gs"),
            text_alpha_bits: 4,
            graphics_alpha_bits: 2,
        }
    }
}

impl ViewerConfig {
    /// Load settings from a JSON file. A missing file yields the defaults;
    /// fields absent from the file keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ViewerConfig::load(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "scale": 2.5, "ghostscript": { "executable": "/opt/gs/bin/gs" } }"#)
            .expect("write");

        let config = ViewerConfig::load(&path).expect("load");
        assert_eq!(config.scale, 2.5);
        assert_eq!(config.ghostscript.executable, PathBuf::from("/opt/gs/bin/gs"));
        assert_eq!(config.ghostscript.text_alpha_bits, 4);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = ViewerConfig {
            scale: 1.75,
            ..Default::default()
        };
        config.save(&path).expect("save");
        assert_eq!(ViewerConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ scale: ").expect("write");
        assert!(matches!(
            ViewerConfig::load(&path),
            Err(crate::RenderError::Serialization(_))
        ));
    }
}
