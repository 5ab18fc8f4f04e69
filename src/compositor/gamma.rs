//! Midtone gamma remap
//!
//! Photoshop-style levels adjustment driven by a single midtone target.
//! Applied to every texel of the gloss raster before it becomes the normal
//! map's alpha, so the curve is precomputed as a 256-entry table.

/// Derive the gamma exponent for a midtone target in [0, 255].
///
/// 128 is the identity. Lower midtones brighten (gamma > 1), higher midtones
/// darken (gamma < 1). Clamped to [0.01, 9.99].
pub fn gamma_for_midtone(midtone: u8) -> f32 {
    if midtone == 128 {
        return 1.0;
    }
    let t = midtone as f32 / 255.0;
    if t < 0.5 {
        (1.0 + 9.0 * (1.0 - 2.0 * t)).min(9.99)
    } else {
        (1.0 - (2.0 * t - 1.0)).max(0.01)
    }
}

/// Lookup table for `out = ceil(255 * (v / 255) ^ (1 / gamma))`
pub fn gamma_lut(midtone: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if midtone == 128 {
        for (v, slot) in lut.iter_mut().enumerate() {
            *slot = v as u8;
        }
        return lut;
    }
    let correction = 1.0 / gamma_for_midtone(midtone);
    for (v, slot) in lut.iter_mut().enumerate() {
        let remapped = 255.0 * (v as f32 / 255.0).powf(correction);
        *slot = remapped.ceil().min(255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midtone_128_is_identity() {
        let lut = gamma_lut(128);
        for v in 0..=255u8 {
            assert_eq!(lut[v as usize], v);
        }
    }

    #[test]
    fn test_gamma_sign_by_midtone() {
        for mt in 1..128u8 {
            assert!(gamma_for_midtone(mt) > 1.0, "midtone {mt}");
        }
        for mt in 129..=255u8 {
            assert!(gamma_for_midtone(mt) < 1.0, "midtone {mt}");
        }
    }

    #[test]
    fn test_gamma_clamped() {
        for mt in 0..=255u8 {
            let gamma = gamma_for_midtone(mt);
            assert!((0.01..=9.99).contains(&gamma), "midtone {mt} -> {gamma}");
        }
        assert_eq!(gamma_for_midtone(0), 9.99);
        assert_eq!(gamma_for_midtone(255), 0.01);
    }

    #[test]
    fn test_lut_endpoints_and_rounding() {
        // Brightening curve: values round up, endpoints stay fixed
        let lut = gamma_lut(64);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert_eq!(lut[128], 225);
        for v in 0..=255usize {
            assert!(lut[v] as usize >= v);
        }
    }

    #[test]
    fn test_lut_monotonic() {
        for mt in [3u8, 64, 128, 200, 250] {
            let lut = gamma_lut(mt);
            for v in 1..=255usize {
                assert!(lut[v] >= lut[v - 1], "midtone {mt} at {v}");
            }
        }
    }
}
