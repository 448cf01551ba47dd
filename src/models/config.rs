use crate::assets;
use crate::error::TilerError;
use mosaic_grid::DEFAULT_TILE_SIZE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Tile side length in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,

    /// Parent directory of the per-source tile directories
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding the grid metadata records
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: PathBuf,

    /// Panel used when no channels are given on the command line
    #[serde(default)]
    pub default_panel: Option<String>,

    /// Named channel lists, in acquisition order
    #[serde(default)]
    pub panels: BTreeMap<String, Vec<String>>,
}

fn default_tile_size() -> usize {
    DEFAULT_TILE_SIZE
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_metadata_dir() -> PathBuf {
    PathBuf::from("final_data")
}

impl AppConfig {
    /// Load configuration from an explicit file, or from the embedded default.
    ///
    /// A file that was asked for but cannot be read or parsed is an error.
    /// A broken embedded config falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TilerError> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(TilerError::io(path))?;
            let config = Self::from_yaml(&content)?;
            tracing::info!(
                path = %path.display(),
                panels = config.panels.len(),
                tile_size = config.tile_size,
                "Loaded configuration"
            );
            return Ok(config);
        }

        match assets::embedded_config().map(|content| Self::from_yaml(&content)) {
            Some(Ok(config)) => {
                tracing::debug!(panels = config.panels.len(), "Loaded embedded configuration");
                Ok(config)
            }
            Some(Err(e)) => {
                tracing::warn!(%e, "Failed to parse embedded config, using defaults");
                Ok(Self::default())
            }
            None => {
                tracing::warn!("Embedded config missing, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate YAML configuration text.
    pub fn from_yaml(content: &str) -> Result<Self, TilerError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TilerError> {
        if self.tile_size == 0 {
            return Err(TilerError::InvalidConfig(
                "tile_size must be greater than zero".to_string(),
            ));
        }
        if let Some((name, _)) = self.panels.iter().find(|(_, channels)| channels.is_empty()) {
            return Err(TilerError::InvalidConfig(format!(
                "panel '{name}' has no channels"
            )));
        }
        if let Some(name) = &self.default_panel {
            if !self.panels.contains_key(name) {
                return Err(TilerError::InvalidConfig(format!(
                    "default_panel '{name}' is not defined"
                )));
            }
        }
        Ok(())
    }

    /// Channel names of a named panel.
    pub fn panel(&self, name: &str) -> Result<&[String], TilerError> {
        self.panels
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TilerError::UnknownPanel(name.to_string()))
    }

    /// Pick the channel names for a run: explicit list, then named panel,
    /// then the default panel.
    pub fn resolve_channels(
        &self,
        panel: Option<&str>,
        custom: Option<&[String]>,
    ) -> Result<Vec<String>, TilerError> {
        if let Some(channels) = custom {
            let channels: Vec<String> = channels
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if channels.is_empty() {
                return Err(TilerError::InvalidConfig(
                    "custom channel list is empty".to_string(),
                ));
            }
            return Ok(channels);
        }

        let name = panel
            .or(self.default_panel.as_deref())
            .ok_or_else(|| {
                TilerError::InvalidConfig(
                    "no channels given and no default_panel configured".to_string(),
                )
            })?;
        Ok(self.panel(name)?.to_vec())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut panels = BTreeMap::new();
        panels.insert(
            "immune".to_string(),
            ["DAPI", "HLADR", "CD8", "CD163", "CD4", "XCR1", "CD3", "PDL1", "PanCK"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        Self {
            tile_size: DEFAULT_TILE_SIZE,
            output_dir: default_output_dir(),
            metadata_dir: default_metadata_dir(),
            default_panel: Some("immune".to_string()),
            panels,
        }
    }
}
