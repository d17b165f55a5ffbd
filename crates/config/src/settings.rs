// Client settings
// Loaded from ~/.config/gqlsheets/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Narrowest column the table renderer can draw ("a..").
pub const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Sheet
    #[serde(rename = "sheet.id")]
    pub sheet_id: String,

    // Grid
    #[serde(rename = "grid.rowIndexWidth")]
    pub row_index_width: f32,

    #[serde(rename = "grid.placeholderColumns")]
    pub placeholder_columns: usize,

    // Rendering
    #[serde(rename = "render.maxColumnWidth")]
    pub max_column_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Sheet
            sheet_id: "1".to_string(),
            // Grid
            row_index_width: 50.0,
            placeholder_columns: 3,
            // Rendering
            max_column_width: 24,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Sheet the grid subscribes to
    "sheet.id": "1",

    // Grid layout
    "grid.rowIndexWidth": 50,
    "grid.placeholderColumns": 3,

    // Table rendering (gsheets --render table)
    "render.maxColumnWidth": 24
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gqlsheets");
        config_dir.join("settings.json")
    }

    /// Load settings from the default path, creating a commented default file
    /// on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Error parsing {}: {}", path.display(), e);
                    eprintln!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Column width cap for table output, never narrower than MIN_COLUMN_WIDTH.
    pub fn effective_max_column_width(&self) -> usize {
        self.max_column_width.max(MIN_COLUMN_WIDTH)
    }

    /// Row-index width, falling back to the default for non-positive values.
    pub fn effective_row_index_width(&self) -> f32 {
        if self.row_index_width > 0.0 {
            self.row_index_width
        } else {
            Self::default().row_index_width
        }
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            eprintln!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
