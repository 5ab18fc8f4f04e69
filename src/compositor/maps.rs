//! Channel compositing
//!
//! Builds the three output rasters for one material from its input maps:
//! the occlusion-baked diffuse with metalness in alpha, the packed specular
//! exponent map, and the normal map with remapped gloss in alpha.

use image::{imageops, DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

use super::gamma::gamma_lut;

/// Blend weight pulling the diffuse toward a gloss-darkened copy when no
/// occlusion map exists
const GLOSS_BLEND: f32 = 0.3;

/// Fixed green level of the exponent map
pub const EXPONENT_GREEN: u8 = 127;

/// Fixed blue level of the exponent map
pub const EXPONENT_BLUE: u8 = 0;

/// Compositing errors
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("ORM image has fewer than three channels and cannot be split")]
    OrmChannels,
}

/// The input rasters for one material, all sized to the normal map's
/// resolution. Missing channels are substituted with neutral solids, except
/// occlusion, whose absence switches the diffuse to the gloss-blend path.
pub struct MapSet {
    pub color: RgbaImage,
    pub ao: Option<RgbaImage>,
    pub normal: RgbaImage,
    pub gloss: RgbaImage,
    pub metal: RgbaImage,
}

impl MapSet {
    /// Assemble a map set: fill in neutral solids for missing channels and
    /// resample everything to the normal map's resolution.
    pub fn assemble(
        color: RgbaImage,
        ao: Option<RgbaImage>,
        normal: RgbaImage,
        gloss: Option<RgbaImage>,
        metal: Option<RgbaImage>,
    ) -> Self {
        let (w, h) = normal.dimensions();
        MapSet {
            color: fit_to(color, w, h),
            ao: ao.map(|img| fit_to(img, w, h)),
            // No gloss map: fully glossy. No metal map: dielectric.
            gloss: gloss
                .map(|img| fit_to(img, w, h))
                .unwrap_or_else(|| solid(w, h, 255)),
            metal: metal
                .map(|img| fit_to(img, w, h))
                .unwrap_or_else(|| solid(w, h, 0)),
            normal,
        }
    }
}

/// The three rasters handed to the VTF encoder
pub struct CompositeOutput {
    pub diffuse: RgbaImage,
    pub exponent: RgbaImage,
    pub normal: RgbaImage,
}

/// Run the full channel composite for one material
pub fn composite(
    maps: &MapSet,
    metallic_factor: f32,
    midtone: u8,
    clear_exponent: bool,
) -> CompositeOutput {
    CompositeOutput {
        diffuse: diffuse(maps, metallic_factor),
        exponent: exponent(maps, clear_exponent),
        normal: normal_with_gloss(maps, midtone),
    }
}

/// Occlusion-baked base color with metalness packed into alpha.
///
/// Alpha is `luma(color) * (1 - f) + luma(metal) * f`, which the material
/// uses as its env-map mask.
pub fn diffuse(maps: &MapSet, metallic_factor: f32) -> RgbaImage {
    let (w, h) = maps.color.dimensions();
    let mut out = RgbaImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let c = maps.color.get_pixel(x, y);
        let rgb = match &maps.ao {
            Some(ao) => {
                let o = ao.get_pixel(x, y);
                [
                    multiply(c.0[0], o.0[0]),
                    multiply(c.0[1], o.0[1]),
                    multiply(c.0[2], o.0[2]),
                ]
            }
            // No occlusion: pull the color toward a gloss-darkened copy
            None => {
                let g = maps.gloss.get_pixel(x, y);
                [
                    blend(c.0[0], multiply(c.0[0], g.0[0]), GLOSS_BLEND),
                    blend(c.0[1], multiply(c.0[1], g.0[1]), GLOSS_BLEND),
                    blend(c.0[2], multiply(c.0[2], g.0[2]), GLOSS_BLEND),
                ]
            }
        };
        let a = blend(
            luma(c),
            luma(maps.metal.get_pixel(x, y)),
            metallic_factor,
        );
        *px = Rgba([rgb[0], rgb[1], rgb[2], a]);
    }
    out
}

/// Specular exponent packing: gloss red and alpha kept, green and blue
/// forced to the engine's expected constants.
pub fn exponent(maps: &MapSet, clear_exponent: bool) -> RgbaImage {
    let green = if clear_exponent { 255 } else { EXPONENT_GREEN };
    let mut out = maps.gloss.clone();
    for px in out.pixels_mut() {
        px.0[1] = green;
        px.0[2] = EXPONENT_BLUE;
    }
    out
}

/// Normal map with the midtone-remapped gloss packed into alpha
pub fn normal_with_gloss(maps: &MapSet, midtone: u8) -> RgbaImage {
    let lut = gamma_lut(midtone);
    let mut out = maps.normal.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let g = maps.gloss.get_pixel(x, y);
        px.0[3] = luma(&Rgba([
            lut[g.0[0] as usize],
            lut[g.0[1] as usize],
            lut[g.0[2] as usize],
            g.0[3],
        ]));
    }
    out
}

/// Split a packed occlusion/roughness/metalness raster into grayscale
/// planes. Roughness comes back already inverted to gloss.
pub fn split_orm(
    image: &DynamicImage,
) -> Result<(RgbaImage, RgbaImage, RgbaImage), CompositeError> {
    if image.color().channel_count() < 3 {
        return Err(CompositeError::OrmChannels);
    }
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut ao = RgbaImage::new(w, h);
    let mut gloss = RgbaImage::new(w, h);
    let mut metal = RgbaImage::new(w, h);
    for (x, y, p) in rgba.enumerate_pixels() {
        let [r, g, b, _] = p.0;
        ao.put_pixel(x, y, Rgba([r, r, r, 255]));
        gloss.put_pixel(x, y, Rgba([255 - g, 255 - g, 255 - g, 255]));
        metal.put_pixel(x, y, Rgba([b, b, b, 255]));
    }
    Ok((ao, gloss, metal))
}

/// Convert a roughness raster to gloss in place (255 - v on RGB)
pub fn invert_rgb(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        px.0[0] = 255 - px.0[0];
        px.0[1] = 255 - px.0[1];
        px.0[2] = 255 - px.0[2];
    }
}

fn fit_to(image: RgbaImage, w: u32, h: u32) -> RgbaImage {
    if image.dimensions() == (w, h) {
        image
    } else {
        imageops::resize(&image, w, h, imageops::FilterType::Triangle)
    }
}

fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
}

/// ITU-R 601 integer luma
fn luma(p: &Rgba<u8>) -> u8 {
    ((299 * p.0[0] as u32 + 587 * p.0[1] as u32 + 114 * p.0[2] as u32) / 1000) as u8
}

/// Per-channel multiply, `a * b / 255`
fn multiply(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16) / 255) as u8
}

/// Linear blend, `a * (1 - f) + b * f`
fn blend(a: u8, b: u8, f: f32) -> u8 {
    (a as f32 * (1.0 - f) + b as f32 * f).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    fn set(
        color: [u8; 4],
        ao: Option<[u8; 4]>,
        gloss: [u8; 4],
        metal: [u8; 4],
    ) -> MapSet {
        MapSet::assemble(
            uniform(2, 2, color),
            ao.map(|p| uniform(2, 2, p)),
            uniform(2, 2, [128, 128, 255, 255]),
            Some(uniform(2, 2, gloss)),
            Some(uniform(2, 2, metal)),
        )
    }

    #[test]
    fn test_diffuse_alpha_blend_law() {
        let maps = set([200, 100, 50, 255], None, [255, 255, 255, 255], [10, 10, 10, 255]);
        // luma(200,100,50) = (299*200 + 587*100 + 114*50) / 1000 = 124
        let zero = diffuse(&maps, 0.0);
        assert_eq!(zero.get_pixel(0, 0).0[3], 124);
        let one = diffuse(&maps, 1.0);
        assert_eq!(one.get_pixel(0, 0).0[3], 10);
    }

    #[test]
    fn test_diffuse_multiplies_occlusion() {
        let maps = set([200, 200, 200, 255], Some([128, 128, 128, 255]), [255, 255, 255, 255], [0, 0, 0, 255]);
        let out = diffuse(&maps, 0.0);
        // 200 * 128 / 255 = 100
        assert_eq!(out.get_pixel(1, 1).0[0], 100);
    }

    #[test]
    fn test_diffuse_without_occlusion_uses_gloss_blend() {
        let maps = set([200, 200, 200, 255], None, [100, 100, 100, 255], [0, 0, 0, 255]);
        let out = diffuse(&maps, 0.0);
        // blend(200, 200*100/255, 0.3) = blend(200, 78, 0.3) = 163.4 -> 163
        assert_eq!(out.get_pixel(0, 0).0[0], 163);
    }

    #[test]
    fn test_exponent_forces_green_and_blue() {
        let maps = set([0, 0, 0, 255], None, [31, 77, 220, 9], [0, 0, 0, 255]);
        let out = exponent(&maps, false);
        for px in out.pixels() {
            assert_eq!(px.0, [31, EXPONENT_GREEN, EXPONENT_BLUE, 9]);
        }
        let cleared = exponent(&maps, true);
        for px in cleared.pixels() {
            assert_eq!(px.0, [31, 255, EXPONENT_BLUE, 9]);
        }
    }

    #[test]
    fn test_normal_alpha_takes_gloss_luma() {
        let maps = set([0, 0, 0, 255], None, [60, 60, 60, 255], [0, 0, 0, 255]);
        let out = normal_with_gloss(&maps, 128);
        for px in out.pixels() {
            assert_eq!(px.0, [128, 128, 255, 60]);
        }
    }

    #[test]
    fn test_full_composite_white_color_black_gloss() {
        // White color, black gloss, factor 0, midtone 128:
        // exponent green is the fixed constant, normal alpha stays 0
        let maps = set([255, 255, 255, 255], None, [0, 0, 0, 255], [0, 0, 0, 255]);
        let out = composite(&maps, 0.0, 128, false);
        for px in out.exponent.pixels() {
            assert_eq!(px.0[1], EXPONENT_GREEN);
        }
        for px in out.normal.pixels() {
            assert_eq!(px.0[3], 0);
        }
        for px in out.diffuse.pixels() {
            assert_eq!(px.0[3], 255);
        }
    }

    #[test]
    fn test_assemble_resamples_to_normal_resolution() {
        let maps = MapSet::assemble(
            uniform(8, 8, [10, 20, 30, 255]),
            None,
            uniform(4, 4, [128, 128, 255, 255]),
            None,
            None,
        );
        assert_eq!(maps.color.dimensions(), (4, 4));
        assert_eq!(maps.gloss.dimensions(), (4, 4));
        assert_eq!(maps.gloss.get_pixel(0, 0).0[0], 255);
        assert_eq!(maps.metal.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_split_orm() {
        let packed = DynamicImage::ImageRgba8(uniform(2, 2, [11, 22, 33, 255]));
        let (ao, gloss, metal) = split_orm(&packed).unwrap();
        assert_eq!(ao.get_pixel(0, 0).0[0], 11);
        assert_eq!(gloss.get_pixel(0, 0).0[0], 255 - 22);
        assert_eq!(metal.get_pixel(0, 0).0[0], 33);
    }

    #[test]
    fn test_split_orm_rejects_grayscale() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            2,
            2,
            image::Luma([7]),
        ));
        assert!(matches!(split_orm(&gray), Err(CompositeError::OrmChannels)));
    }

    #[test]
    fn test_invert_rgb_keeps_alpha() {
        let mut img = uniform(2, 2, [10, 20, 30, 200]);
        invert_rgb(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [245, 235, 225, 200]);
    }
}
