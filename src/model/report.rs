use super::Namespace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Detection outcome for one layer directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerReport {
    pub layer: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    /// Name of the detector that produced `namespace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector: Option<String>,
    /// Number of required files found in the layer.
    pub files_loaded: usize,
    /// Set when the layer could not be read at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayerReport {
    pub fn new(layer: impl Into<PathBuf>) -> Self {
        Self {
            layer: layer.into(),
            namespace: None,
            detector: None,
            files_loaded: 0,
            error: None,
        }
    }

    pub fn failed(layer: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(layer)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub layers: Vec<LayerReport>,
    pub scan_time: DateTime<Utc>,
}

impl ScanReport {
    pub fn new(layers: Vec<LayerReport>) -> Self {
        Self {
            layers,
            scan_time: Utc::now(),
        }
    }

    pub fn detected(&self) -> usize {
        self.layers.iter().filter(|l| l.namespace.is_some()).count()
    }
}
