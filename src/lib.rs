//! sourcemat - PBR texture sets to Source engine materials
//!
//! Scans a folder for PBR texture sets (color, occlusion, normal,
//! roughness/gloss, metalness), composites them into the three rasters the
//! Source engine's phong shading expects, and writes VTF textures plus VMT
//! material documents.

pub mod compositor;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod vmt;
pub mod vtf;
