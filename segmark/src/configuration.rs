use std::path::{Path, PathBuf};

use segmark_core::{
    core::{
        persistence::{AnnotationFile, DEFAULT_INDEX_COLUMN, DEFAULT_LABEL_COLUMN},
        player::DEFAULT_SEEK_SECONDS,
    },
    models::{label::DEFAULT_LABEL_NAMES, LabelError, LabelSet},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ANNOTATION_EXTENSION: &str = "csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub labels:      LabelsConfig,
    pub playback:    PlaybackConfig,
    pub annotations: AnnotationsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Display names of labels `1..=names.len()`.
    pub names:    Vec<String>,
    /// Label whose time is left out of percentages, if any.
    pub terminal: Option<u8>,
}

impl Default for LabelsConfig {
    #[inline]
    fn default() -> Self {
        Self {
            names:    DEFAULT_LABEL_NAMES.iter().map(|name| (*name).to_owned()).collect(),
            terminal: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Seek distance while playing. Paused seeks always move one frame.
    pub seek_seconds: f64,
}

impl Default for PlaybackConfig {
    #[inline]
    fn default() -> Self {
        Self {
            seek_seconds: DEFAULT_SEEK_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    /// Replaces the video's extension to locate its annotation file.
    pub extension:    String,
    pub index_column: String,
    pub label_column: String,
}

impl Default for AnnotationsConfig {
    #[inline]
    fn default() -> Self {
        Self {
            extension:    DEFAULT_ANNOTATION_EXTENSION.to_owned(),
            index_column: DEFAULT_INDEX_COLUMN.to_owned(),
            label_column: DEFAULT_LABEL_COLUMN.to_owned(),
        }
    }
}

impl Configuration {
    #[inline]
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut buffer = vec![];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer).map_err(ConfigError::Serialize)?;
        buffer.push(b'\n');
        if let Some(directory) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(directory).map_err(ConfigError::Save)?;
        }
        std::fs::write(path, buffer).map_err(ConfigError::Save)?;
        Ok(())
    }

    #[inline]
    pub fn load(config_path: &Path) -> Result<Option<Self>, ConfigError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(config_path).map_err(|error| ConfigError::Load {
            path:   config_path.to_path_buf(),
            reason: error.to_string(),
        })?;
        let data = serde_json::from_str(&data).map_err(|error| ConfigError::Load {
            path:   config_path.to_path_buf(),
            reason: error.to_string(),
        })?;

        Ok(Some(data))
    }

    /// The configuration at `config_path`, or the defaults when there is none.
    #[inline]
    pub fn load_or_default(config_path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load(config_path)?.unwrap_or_default())
    }

    #[inline]
    pub fn label_set(&self) -> Result<LabelSet, LabelError> {
        LabelSet::new(self.labels.names.clone(), self.labels.terminal)
    }

    /// `explicit`, or the video path with the configured annotation extension.
    #[inline]
    pub fn annotation_path(&self, video: &Path, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(
            || video.with_extension(&self.annotations.extension),
            Path::to_path_buf,
        )
    }

    #[inline]
    pub fn annotation_file(&self, video: &Path, explicit: Option<&Path>) -> AnnotationFile {
        AnnotationFile::new(&self.annotation_path(video, explicit))
            .with_columns(&self.annotations.index_column, &self.annotations.label_column)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config file {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("Failed to serialize config file: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to save config file: {0}")]
    Save(#[from] std::io::Error),
}
