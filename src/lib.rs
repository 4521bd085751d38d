pub mod config;
pub mod detector;
pub mod layer;
pub mod logging;
pub mod model;
pub mod output;
pub mod version;

pub use config::Config;
pub use detector::{default_registry, Detection, DetectorRegistry, LayerFiles, NamespaceDetector};
pub use layer::{load_layer, LayerError};
pub use model::{score_to_priority, LayerReport, Namespace, Priority, ScanReport};
pub use version::{Version, VersionError, VersionScheme};
