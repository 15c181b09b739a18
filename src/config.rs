//! Runtime configuration.
//!
//! Loaded from config.json next to the executable. Every field has a default,
//! so a partial file only overrides what it names, and a missing or broken
//! file falls back to defaults with a log line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the game window is found and what counts as a target inside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Substring matched against top-level window titles. First match wins.
    pub window_title: String,
    /// Rows cut off the top of the window before detection
    pub title_bar_height: i32,
    /// A pixel is a candidate when `R - max(G, B)` exceeds this
    pub red_threshold: u8,
    /// Boxes smaller than this many pixels are dropped as noise
    pub min_target_area: i64,
    /// Merge boxes that overlap or share an edge
    pub merge_overlapping: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            window_title: "War Thunder".to_string(),
            title_bar_height: 28,
            red_threshold: 85,
            min_target_area: 16,
            merge_overlapping: true,
        }
    }
}

/// Overlay placement and marker look.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Screen position; `None` uses the captured display's origin
    pub x: Option<i32>,
    pub y: Option<i32>,
    /// Size; `None` uses the captured display's size
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Marker color as `[b, g, r]`
    pub outline_color: [u8; 3],
    pub outline_thickness: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: None,
            height: None,
            outline_color: [0, 255, 0],
            outline_thickness: 2,
        }
    }
}

/// Main loop pacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Sleep between iterations (milliseconds)
    pub frame_interval_ms: u64,
    /// Stop after this many iterations; run forever when unset
    pub max_frames: Option<u64>,
    /// Save the region of interest of frames that produced targets
    pub save_snapshots: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            max_frames: None,
            save_snapshots: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub overlay: OverlayConfig,
    pub driver: DriverConfig,
}

/// Loads config.json from the executable's directory, or returns defaults.
pub fn load_config() -> AppConfig {
    load_from(&crate::paths::get_config_path())
}

/// Loads a config file, falling back to defaults on any problem.
pub fn load_from(config_path: &Path) -> AppConfig {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    AppConfig::default()
}
