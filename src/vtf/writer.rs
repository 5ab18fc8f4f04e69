//! VTF file writing
//!
//! Emits version 7.2 files: an 80-byte little-endian header followed by one
//! frame of one mip level. No thumbnail is written. Block compression goes
//! through image_dds; RGBA8888 is the raw buffer.

use anyhow::{Context, Result};
use binrw::{binrw, BinWrite};
use image::RgbaImage;
use image_dds::{ImageFormat, Mipmaps, Quality, SurfaceRgba8};
use std::io::Cursor;
use std::path::Path;

use crate::output;

const FLAG_NOMIP: u32 = 0x0100;
const FLAG_NOLOD: u32 = 0x0200;
const FLAG_EIGHT_BIT_ALPHA: u32 = 0x2000;

/// High-res image formats we emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtfFormat {
    Dxt1,
    Dxt5,
    Rgba8888,
}

impl VtfFormat {
    /// VTF image format index
    fn vtf_index(self) -> i32 {
        match self {
            VtfFormat::Rgba8888 => 0,
            VtfFormat::Dxt1 => 13,
            VtfFormat::Dxt5 => 15,
        }
    }

    /// Block-compression target, None for raw RGBA
    fn to_image_format(self) -> Option<ImageFormat> {
        match self {
            VtfFormat::Dxt1 => Some(ImageFormat::BC1RgbaUnorm),
            VtfFormat::Dxt5 => Some(ImageFormat::BC3RgbaUnorm),
            VtfFormat::Rgba8888 => None,
        }
    }

    fn has_alpha(self) -> bool {
        !matches!(self, VtfFormat::Dxt1)
    }

    /// Format name for logging
    pub fn name(&self) -> &'static str {
        match self {
            VtfFormat::Dxt1 => "DXT1",
            VtfFormat::Dxt5 => "DXT5",
            VtfFormat::Rgba8888 => "RGBA8888",
        }
    }
}

/// VTF 7.2 header, 80 bytes on disk
#[binrw]
#[brw(little, magic = b"VTF\0")]
#[derive(Debug, Clone, PartialEq)]
pub struct VtfHeader {
    pub version: [u32; 2],
    pub header_size: u32,
    pub width: u16,
    pub height: u16,
    pub flags: u32,
    pub frames: u16,
    pub first_frame: u16,
    padding0: [u8; 4],
    pub reflectivity: [f32; 3],
    padding1: [u8; 4],
    pub bumpmap_scale: f32,
    pub high_res_format: i32,
    pub mipmap_count: u8,
    pub low_res_format: i32,
    pub low_res_width: u8,
    pub low_res_height: u8,
    pub depth: u16,
    padding2: [u8; 15],
}

/// Total on-disk header size, including the magic
const HEADER_SIZE: u32 = 80;

impl VtfHeader {
    fn new(width: u16, height: u16, format: VtfFormat) -> Self {
        let mut flags = FLAG_NOMIP | FLAG_NOLOD;
        if format.has_alpha() {
            flags |= FLAG_EIGHT_BIT_ALPHA;
        }
        VtfHeader {
            version: [7, 2],
            header_size: HEADER_SIZE,
            width,
            height,
            flags,
            frames: 1,
            first_frame: 0,
            padding0: [0; 4],
            reflectivity: [1.0, 1.0, 1.0],
            padding1: [0; 4],
            bumpmap_scale: 1.0,
            high_res_format: format.vtf_index(),
            mipmap_count: 1,
            low_res_format: -1,
            low_res_width: 0,
            low_res_height: 0,
            depth: 1,
            padding2: [0; 15],
        }
    }
}

/// Pre-encode negate-and-scale-by-255 in wrapping u8 arithmetic, kept for
/// compatibility with existing VTF sets. `(-v * 255) mod 256 == v`, so the
/// bytes come out unchanged.
fn export_transform(data: &mut [u8]) {
    for v in data.iter_mut() {
        *v = v.wrapping_neg().wrapping_mul(255);
    }
}

fn encode(image: &RgbaImage, format: VtfFormat) -> Result<Vec<u8>> {
    let mut raw = image.clone();
    export_transform(&mut raw);
    match format.to_image_format() {
        Some(block_format) => {
            let surface = SurfaceRgba8::from_image(&raw);
            let encoded = surface
                .encode(block_format, Quality::Normal, Mipmaps::Disabled)
                .with_context(|| format!("{} encode failed", format.name()))?;
            Ok(encoded.data)
        }
        None => Ok(raw.into_raw()),
    }
}

/// Encode a raster and write it as a single-mip VTF, replacing any existing
/// file at the destination.
pub fn write_vtf(image: &RgbaImage, path: &Path, format: VtfFormat) -> Result<()> {
    let (width, height) = image.dimensions();
    let header = VtfHeader::new(width as u16, height as u16, format);
    let data = encode(image, format)?;

    let mut bytes = Cursor::new(Vec::with_capacity(HEADER_SIZE as usize + data.len()));
    header
        .write(&mut bytes)
        .context("VTF header serialization failed")?;
    bytes.get_mut().extend_from_slice(&data);

    output::write_replace(path, bytes.get_ref())
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::BinRead;
    use image::Rgba;

    #[test]
    fn test_export_transform_is_u8_identity() {
        let mut data: Vec<u8> = (0..=255).collect();
        export_transform(&mut data);
        for (i, v) in data.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn test_header_is_80_bytes() {
        let header = VtfHeader::new(64, 32, VtfFormat::Dxt5);
        let mut bytes = Cursor::new(Vec::new());
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.get_ref().len(), 80);
        assert_eq!(&bytes.get_ref()[0..4], b"VTF\0");
    }

    #[test]
    fn test_header_round_trip() {
        let header = VtfHeader::new(128, 128, VtfFormat::Dxt1);
        let mut bytes = Cursor::new(Vec::new());
        header.write(&mut bytes).unwrap();
        bytes.set_position(0);
        let back = VtfHeader::read(&mut bytes).unwrap();
        assert_eq!(back, header);
        assert_eq!(back.version, [7, 2]);
        assert_eq!(back.high_res_format, 13);
        // DXT1 carries no alpha flag
        assert_eq!(back.flags & FLAG_EIGHT_BIT_ALPHA, 0);
        assert_ne!(back.flags & FLAG_NOMIP, 0);
    }

    #[test]
    fn test_write_rgba_vtf() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tex.vtf");
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));

        write_vtf(&image, &path, VtfFormat::Rgba8888)?;

        let bytes = std::fs::read(&path)?;
        assert_eq!(bytes.len(), 80 + 2 * 2 * 4);
        assert_eq!(&bytes[0..4], b"VTF\0");
        // Raw payload survives the export transform unchanged
        assert_eq!(&bytes[80..84], &[1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_write_dxt1_vtf_payload_is_one_block() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tex.vtf");
        let image = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));

        write_vtf(&image, &path, VtfFormat::Dxt1)?;

        let bytes = std::fs::read(&path)?;
        // One 4x4 BC1 block is 8 bytes
        assert_eq!(bytes.len(), 80 + 8);
        Ok(())
    }
}
