//! Application configuration

use crate::category::ALL_LABEL;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub gallery: GalleryConfig,
    pub upload: UploadConfig,
    pub particles: ParticleConfig,
    pub download: DownloadConfig,
    /// Command id (optionally `id:arg`) -> key strings such as `Ctrl+u`
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            gallery: GalleryConfig::default(),
            upload: UploadConfig::default(),
            particles: ParticleConfig::default(),
            download: DownloadConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub theme: String,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_retention_days: u32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "dusk".to_string(),
            log_level: "info".to_string(),
            log_retention_days: 7,
            window_width: 1280,
            window_height: 800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub view_mode: ViewMode,
    /// Decoded images are downscaled to fit this edge length
    pub max_texture_size: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Grid,
            max_texture_size: 1600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub categories: Vec<String>,
    pub default_category: String,
    /// Artificial delay standing in for the upload round-trip
    pub simulated_delay_ms: u64,
    /// Edge length of preview thumbnails
    pub preview_size: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            categories: ["Nature", "Urban", "Art", "People", "Technology", "Food"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_category: "Nature".to_string(),
            simulated_delay_ms: 1500,
            preview_size: 160,
        }
    }
}

impl UploadConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub enabled: bool,
    pub count: usize,
    pub tick_interval_ms: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 50,
            tick_interval_ms: 50,
        }
    }
}

impl ParticleConfig {
    pub fn tick_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Target directory; the platform download folder when unset
    pub directory: Option<PathBuf>,
    /// Extension used when the format cannot be sniffed
    pub fallback_extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: None,
            fallback_extension: "jpg".to_string(),
        }
    }
}

impl DownloadConfig {
    pub fn target_dir(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(app_fs::default_download_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "masonry")]
    Masonry,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::Masonry,
            ViewMode::Masonry => ViewMode::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::Masonry => "Masonry",
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Parse configuration text; missing sections take their defaults
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;

        // "All" is the filter sentinel, never a real category
        let before = config.upload.categories.len();
        config.upload.categories.retain(|c| c != ALL_LABEL);
        if config.upload.categories.len() != before {
            tracing::warn!("Ignoring upload category {:?}", ALL_LABEL);
        }
        if config.upload.default_category == ALL_LABEL {
            config.upload.default_category = config
                .upload
                .categories
                .first()
                .cloned()
                .unwrap_or_else(|| UploadConfig::default().default_category);
        }

        if !config.upload.categories.contains(&config.upload.default_category) {
            if let Some(first) = config.upload.categories.first() {
                tracing::warn!(
                    "Default upload category {:?} not in list, using {:?}",
                    config.upload.default_category,
                    first
                );
                config.upload.default_category = first.clone();
            } else {
                config.upload.categories.push(config.upload.default_category.clone());
            }
        }
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "ImageGallery", "ImageGallery")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Lightbox
    kb.insert("lightbox.close".into(), vec!["Escape".into()]);
    kb.insert("lightbox.prev".into(), vec!["Left".into()]);
    kb.insert("lightbox.next".into(), vec!["Right".into()]);
    kb.insert("lightbox.download".into(), vec!["d".into()]);

    // Gallery
    kb.insert("gallery.toggle_view".into(), vec!["v".into()]);
    kb.insert("gallery.filter:All".into(), vec!["0".into()]);
    kb.insert("gallery.reload".into(), vec!["F5".into()]);

    // Upload
    kb.insert("upload.open".into(), vec!["Ctrl+u".into()]);

    // App
    kb.insert("app.exit".into(), vec!["q".into()]);

    kb
}
