//! VTF encoding
//!
//! Minimal Valve Texture Format writer: a 7.2 header described with binrw,
//! followed by one frame of one mip level, block-compressed with image_dds.

mod writer;

pub use writer::{write_vtf, VtfFormat, VtfHeader};
