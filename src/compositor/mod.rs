//! Channel compositor
//!
//! Per-pixel arithmetic turning the PBR inputs for one material into the
//! three rasters the engine expects. Pure functions over RGBA8 buffers;
//! no I/O happens here.

mod gamma;
mod maps;

pub use gamma::{gamma_for_midtone, gamma_lut};
pub use maps::{
    composite, diffuse, exponent, invert_rgb, normal_with_gloss, split_orm, CompositeError,
    CompositeOutput, MapSet, EXPONENT_BLUE, EXPONENT_GREEN,
};
