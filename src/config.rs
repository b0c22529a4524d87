use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::ColorScale;
use crate::data::loader::DecoderBackend;
use crate::data::series::{MarkerSizing, DEFAULT_MAX_PX, DEFAULT_MIN_PX, DEFAULT_P_VALUE_FLOOR};
use crate::error::ConfigError;
use crate::state::PlotKind;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GENECOR_VIEWER_CONFIG";
/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "genecor-viewer.json";

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Start-up settings. Every field is optional in the JSON file.
///
/// ```json
/// {
///   "default_data_path": "data/adipose_gene_pathway_cor.csv",
///   "decoder": "csv",
///   "top_positive": 15,
///   "palette": "rdbu"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// File opened at start-up when no path is given on the command line.
    pub default_data_path: Option<PathBuf>,
    pub decoder: DecoderBackend,
    pub top_positive: usize,
    pub top_negative: usize,
    pub marker_min_px: f64,
    pub marker_max_px: f64,
    pub p_value_floor: f64,
    pub palette: ColorScale,
    pub reverse_palette: bool,
    pub show_labels: bool,
    pub plot_kind: PlotKind,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_data_path: None,
            decoder: DecoderBackend::Csv,
            top_positive: 10,
            top_negative: 10,
            marker_min_px: DEFAULT_MIN_PX,
            marker_max_px: DEFAULT_MAX_PX,
            p_value_floor: DEFAULT_P_VALUE_FLOOR,
            palette: ColorScale::Viridis,
            reverse_palette: false,
            show_labels: false,
            plot_kind: PlotKind::Bubble,
        }
    }
}

impl ViewerConfig {
    /// Read a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `$GENECOR_VIEWER_CONFIG`, else `./genecor-viewer.json`, else
    /// defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        Ok(Self::default())
    }

    pub fn sizing(&self) -> MarkerSizing {
        MarkerSizing {
            min_px: self.marker_min_px,
            max_px: self.marker_max_px,
        }
    }
}
