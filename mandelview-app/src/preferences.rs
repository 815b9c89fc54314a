use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use mandelview_render::ExplorerConfig;

/// Settings read from `preferences.json`. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Directory for exported frames. Empty means `images/` next to the binary.
    #[serde(default)]
    pub images_dir: String,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            images_dir: String::new(),
            explorer: ExplorerConfig::default(),
        }
    }
}

impl AppPreferences {
    /// Load preferences from `path`, falling back to defaults.
    ///
    /// A missing file is normal; an unreadable or malformed one is logged.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<AppPreferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// Persist preferences to `path`, creating parent directories.
    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    pub fn images_directory(&self) -> PathBuf {
        if self.images_dir.is_empty() {
            crate::app_dir::images_directory()
        } else {
            PathBuf::from(&self.images_dir)
        }
    }
}

pub fn default_path() -> PathBuf {
    crate::app_dir::exe_directory().join("preferences.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandelview_render::PaletteStrategy;

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("mandelview_no_such_prefs.json");
        let _ = fs::remove_file(&path);
        assert_eq!(AppPreferences::load(&path), AppPreferences::default());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join("mandelview_test_prefs");
        let path = dir.join("preferences.json");
        let mut prefs = AppPreferences::default();
        prefs.width = 640;
        prefs.explorer.palette = PaletteStrategy::Modular;
        prefs.save(&path);

        assert_eq!(AppPreferences::load(&path), prefs);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = std::env::temp_dir().join("mandelview_test_bad_prefs");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("preferences.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppPreferences::load(&path), AppPreferences::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let prefs: AppPreferences =
            serde_json::from_str(r#"{ "height": 480, "explorer": { "parallel": false } }"#)
                .unwrap();
        assert_eq!(prefs.width, 1280);
        assert_eq!(prefs.height, 480);
        assert!(!prefs.explorer.parallel);
        assert!(prefs.images_dir.is_empty());
    }
}
