//! Per-material conversion pipeline
//!
//! Materials are processed strictly one after another; every buffer for a
//! material is dropped before the next one starts. A failing material either
//! aborts the run or is skipped, depending on the strictness setting.

use anyhow::{anyhow, bail, Context, Result};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::compositor::{self, MapSet};
use crate::config::{Config, GlossConvention};
use crate::output;
use crate::scan::{self, MaterialJob};
use crate::vmt;
use crate::vtf::{write_vtf, VtfFormat};

/// Counts reported at the end of a run
#[derive(Debug, Default)]
pub struct RunStats {
    pub converted: usize,
    pub failed: usize,
}

/// Convert every material found in the input directory
pub fn run(config: &Config) -> Result<RunStats> {
    let names = scan::find_material_names(config)?;
    if names.is_empty() {
        bail!(
            "No materials matching '*{}.{}' found in {}",
            config.suffixes.color,
            config.input_extension,
            config.input_dir.display()
        );
    }

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} | {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut stats = RunStats::default();
    for name in &names {
        pb.set_message(name.clone());
        match convert_material(config, name) {
            Ok(()) => stats.converted += 1,
            Err(e) if config.strict => {
                pb.finish_and_clear();
                return Err(e.context(format!("Material '{name}' failed")));
            }
            Err(e) => {
                warn!("Skipping material '{}': {:#}", name, e);
                stats.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if config.phong_warps {
        copy_phongwarp(config);
    }

    Ok(stats)
}

/// Run the whole pipeline for one material
fn convert_material(config: &Config, name: &str) -> Result<()> {
    let job = scan::resolve_job(config, name)?;
    let maps = if config.orm_mode {
        load_orm_maps(&job)?
    } else {
        load_maps(config, &job)?
    };

    let composited = compositor::composite(
        &maps,
        config.metallic_factor(),
        config.gamma_midtone,
        config.clear_exponent,
    );
    drop(maps);

    let exponent_format = if config.use_compression {
        VtfFormat::Dxt5
    } else {
        VtfFormat::Dxt1
    };
    let normal_format = if config.use_compression {
        VtfFormat::Dxt5
    } else {
        VtfFormat::Rgba8888
    };

    let out = |suffix: &str| config.output_dir.join(format!("{name}{suffix}"));
    write_vtf(&composited.diffuse, &out("_c.vtf"), VtfFormat::Dxt5)?;
    write_vtf(&composited.exponent, &out("_m.vtf"), exponent_format)?;
    write_vtf(&composited.normal, &out("_n.vtf"), normal_format)?;

    if config.export_tga {
        save_tga(&composited.normal, &out("_n.tga"))?;
    }

    let (doc_path, doc) = if config.clear_exponent {
        (out("_s.vmt"), vmt::normalized_material(name, config))
    } else {
        (out(".vmt"), vmt::full_material(name, config))
    };
    output::write_replace(&doc_path, doc.as_bytes())?;

    info!("Converted material '{}'", name);
    Ok(())
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .to_rgba8())
}

fn load_optional(path: Option<&PathBuf>) -> Result<Option<RgbaImage>> {
    path.map(|p| load_rgba(p)).transpose()
}

fn load_maps(config: &Config, job: &MaterialJob) -> Result<MapSet> {
    let color = load_rgba(&job.color)?;
    let normal = load_rgba(&job.normal)?;
    let ao = load_optional(job.ao.as_ref())?;
    let mut gloss = load_optional(job.gloss.as_ref())?;
    let metal = load_optional(job.metal.as_ref())?;

    if config.gloss_convention == GlossConvention::Rough {
        if let Some(g) = gloss.as_mut() {
            compositor::invert_rgb(g);
        }
    }

    Ok(MapSet::assemble(color, ao, normal, gloss, metal))
}

fn load_orm_maps(job: &MaterialJob) -> Result<MapSet> {
    let color = load_rgba(&job.color)?;
    let normal = load_rgba(&job.normal)?;
    let orm_path = job
        .orm
        .as_deref()
        .ok_or_else(|| anyhow!("No ORM map resolved for '{}'", job.name))?;
    let orm = image::open(orm_path)
        .with_context(|| format!("Failed to open {}", orm_path.display()))?;
    let (ao, gloss, metal) = compositor::split_orm(&orm)
        .with_context(|| format!("Malformed ORM map {}", orm_path.display()))?;
    Ok(MapSet::assemble(color, Some(ao), normal, Some(gloss), Some(metal)))
}

fn save_tga(image: &RgbaImage, path: &Path) -> Result<()> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Tga)
        .context("TGA encode failed")?;
    output::write_replace(path, bytes.get_ref())
}

/// Companion texture for the phong warp reference in the materials. Expected
/// next to the settings file in the working directory.
fn copy_phongwarp(config: &Config) {
    let source = Path::new("phongwarp_steel.vtf");
    if !source.is_file() {
        warn!("Phong warps enabled but phongwarp_steel.vtf not found in the working directory");
        return;
    }
    let result = std::fs::read(source)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| {
            output::write_replace(&config.output_dir.join("phongwarp_steel.vtf"), &bytes)
        });
    if let Err(e) = result {
        warn!("Failed to copy phongwarp texture: {:#}", e);
    }
}
