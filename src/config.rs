//! Run configuration
//!
//! One flat JSON settings file, parsed once into a typed struct and immutable
//! for the rest of the run. Every knob is validated at load time so a typo
//! fails before any image work starts.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How the roughness-channel input is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlossConvention {
    /// Input stores roughness; inverted (255 - v) to get gloss
    Rough,
    /// Input already stores gloss
    Gloss,
}

/// Filename suffixes identifying each channel of a material
///
/// A channel with no suffix (or an empty one) is treated as absent for every
/// material. Color and normal are mandatory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Suffixes {
    pub color: String,
    pub ao: Option<String>,
    pub normal: String,
    pub roughness: Option<String>,
    pub metal: Option<String>,
    /// Packed occlusion/roughness/metalness raster (ORM mode only)
    pub orm: Option<String>,
}

impl Default for Suffixes {
    fn default() -> Self {
        Suffixes {
            color: "_color".to_string(),
            ao: Some("_ao".to_string()),
            normal: "_normal".to_string(),
            roughness: Some("_rough".to_string()),
            metal: Some("_metal".to_string()),
            orm: Some("_orm".to_string()),
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for input images
    pub input_dir: PathBuf,

    /// Directory receiving VTF/VMT output; also the texture path prefix
    /// written into the material documents
    pub output_dir: PathBuf,

    /// Input image file extension, without the dot
    pub input_extension: String,

    /// Per-channel filename suffixes
    pub suffixes: Suffixes,

    /// Whether the roughness channel holds roughness or gloss
    pub gloss_convention: GlossConvention,

    /// Midtone target for the gamma remap of the normal map alpha;
    /// 128 leaves the gloss untouched
    pub gamma_midtone: u8,

    /// Metalness strength, 0-255
    pub metalness: u8,

    /// Encode all three outputs as DXT5 instead of DXT1/RGBA8888
    pub use_compression: bool,

    /// Force the exponent map's green channel to full white and emit the
    /// normalized material variant
    pub clear_exponent: bool,

    /// Inputs are color + packed ORM + normal instead of five separate maps
    pub orm_mode: bool,

    /// Emit the MwEnvMapTint proxy block in material documents
    pub material_proxies: bool,

    /// Reference a phong warp texture instead of fresnel ranges
    pub phong_warps: bool,

    /// Also save the composited normal map as TGA
    pub export_tga: bool,

    /// Abort the whole run on the first failing material instead of
    /// skipping it
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("materials"),
            input_extension: "png".to_string(),
            suffixes: Suffixes::default(),
            gloss_convention: GlossConvention::Rough,
            gamma_midtone: 128,
            metalness: 128,
            use_compression: false,
            clear_exponent: false,
            orm_mode: false,
            material_proxies: false,
            phong_warps: false,
            export_tga: false,
            strict: false,
        }
    }
}

impl Config {
    /// Read and validate a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputDirNotFound(self.input_dir.clone()));
        }
        if self.input_extension.is_empty() || self.input_extension.starts_with('.') {
            return Err(ConfigError::BadExtension(self.input_extension.clone()));
        }
        if self.suffixes.color.is_empty() {
            return Err(ConfigError::EmptySuffix("color"));
        }
        if self.suffixes.normal.is_empty() {
            return Err(ConfigError::EmptySuffix("normal"));
        }
        if self.orm_mode && self.suffixes.orm.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingOrmSuffix);
        }
        Ok(())
    }

    /// Metalness as the 0-1 blend factor for the diffuse alpha.
    /// The 0.83 scale compensates for the engine's Lambert term.
    pub fn metallic_factor(&self) -> f32 {
        self.metalness as f32 / 255.0 * 0.83
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {0}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Settings file is not valid JSON")]
    Parse(#[from] serde_json::Error),

    #[error("Input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    #[error("Input extension must be non-empty, without a leading dot: '{0}'")]
    BadExtension(String),

    #[error("The {0} suffix must not be empty")]
    EmptySuffix(&'static str),

    #[error("ORM mode requires an 'orm' filename suffix")]
    MissingOrmSuffix,
}
