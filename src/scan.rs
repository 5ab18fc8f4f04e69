//! Input discovery
//!
//! Materials are identified by filename convention: every file ending in
//! `<color suffix>.<ext>` names one material, and sibling channels are
//! located by swapping in the other configured suffixes.

use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;

/// Resolved input paths for one material
#[derive(Debug, Clone)]
pub struct MaterialJob {
    pub name: String,
    pub color: PathBuf,
    pub normal: PathBuf,
    pub ao: Option<PathBuf>,
    /// Roughness-or-gloss channel
    pub gloss: Option<PathBuf>,
    pub metal: Option<PathBuf>,
    /// Packed occlusion/roughness/metalness raster (ORM mode)
    pub orm: Option<PathBuf>,
}

/// List the material names present in the input directory, sorted
pub fn find_material_names(config: &Config) -> Result<Vec<String>> {
    let tail = format!("{}.{}", config.suffixes.color, config.input_extension);
    let mut names = Vec::new();
    for entry in WalkDir::new(&config.input_dir).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if let Some(name) = file_name.strip_suffix(&tail) {
            if !name.is_empty() {
                debug!("Found material '{}'", name);
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Resolve the per-channel input paths for one material
pub fn resolve_job(config: &Config, name: &str) -> Result<MaterialJob> {
    let color = require(config, name, "color", &config.suffixes.color)?;
    let normal = require(config, name, "normal", &config.suffixes.normal)?;

    if config.orm_mode {
        let orm_suffix = config.suffixes.orm.as_deref().unwrap_or_default();
        let orm = require(config, name, "ORM", orm_suffix)?;
        return Ok(MaterialJob {
            name: name.to_string(),
            color,
            normal,
            ao: None,
            gloss: None,
            metal: None,
            orm: Some(orm),
        });
    }

    Ok(MaterialJob {
        name: name.to_string(),
        color,
        normal,
        ao: optional(config, name, "occlusion", config.suffixes.ao.as_deref()),
        gloss: optional(config, name, "roughness", config.suffixes.roughness.as_deref()),
        metal: optional(config, name, "metalness", config.suffixes.metal.as_deref()),
        orm: None,
    })
}

fn channel_path(config: &Config, name: &str, suffix: &str) -> PathBuf {
    config
        .input_dir
        .join(format!("{}{}.{}", name, suffix, config.input_extension))
}

fn require(config: &Config, name: &str, label: &str, suffix: &str) -> Result<PathBuf> {
    let path = channel_path(config, name, suffix);
    if path.is_file() {
        Ok(path)
    } else {
        bail!("Missing {} map: {}", label, path.display())
    }
}

fn optional(config: &Config, name: &str, label: &str, suffix: Option<&str>) -> Option<PathBuf> {
    let suffix = match suffix {
        Some(s) if !s.is_empty() => s,
        _ => return None,
    };
    let path = channel_path(config, name, suffix);
    if path.is_file() {
        Some(path)
    } else {
        warn!(
            "Configured {} map for '{}' not found at {}, treating as absent",
            label,
            name,
            path.display()
        );
        None
    }
}
