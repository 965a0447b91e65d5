//! Per-pixel color adjustment: modulate and gamma.
//!
//! Modulation works in Oklab/Oklch so that lightness, chroma and hue can be
//! changed independently without the hue shifts an HSL-based adjustment
//! produces on saturated colors:
//!
//! 1. sRGB → linear RGB → Oklab
//! 2. `L *= brightness`, `(a, b)` scaled by `saturation` and rotated by `hue`
//! 3. Oklab → linear RGB → sRGB, clamped to `[0, 255]`
//!
//! Gamma is applied after modulation through a 256-entry lookup table:
//! `out = 255 · (in / 255)^(1 / gamma)`, so `gamma > 1` lifts mid-tones.
//! A gamma of exactly 1.0 skips the table, leaving the modulated pixels as
//! they are.
//!
//! Alpha is never touched.

use super::params::Modulation;
use image::{DynamicImage, RgbImage, RgbaImage};

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Oklab coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Oklab {
    pub(crate) fn from_rgb8(rgb: [u8; 3]) -> Self {
        let r = srgb_to_linear(rgb[0] as f32 / 255.0);
        let g = srgb_to_linear(rgb[1] as f32 / 255.0);
        let b = srgb_to_linear(rgb[2] as f32 / 255.0);

        let l = 0.412_221_46 * r + 0.536_332_55 * g + 0.051_445_995 * b;
        let m = 0.211_903_5 * r + 0.680_699_5 * g + 0.107_396_96 * b;
        let s = 0.088_302_46 * r + 0.281_718_85 * g + 0.629_978_7 * b;

        let (l, m, s) = (l.cbrt(), m.cbrt(), s.cbrt());

        Self {
            l: 0.210_454_26 * l + 0.793_617_8 * m - 0.004_072_047 * s,
            a: 1.977_998_5 * l - 2.428_592_2 * m + 0.450_593_7 * s,
            b: 0.025_904_037 * l + 0.782_771_77 * m - 0.808_675_77 * s,
        }
    }

    pub(crate) fn to_rgb8(self) -> [u8; 3] {
        let l = self.l + 0.396_337_78 * self.a + 0.215_803_76 * self.b;
        let m = self.l - 0.105_561_346 * self.a - 0.063_854_17 * self.b;
        let s = self.l - 0.089_484_18 * self.a - 1.291_485_5 * self.b;

        let (l, m, s) = (l * l * l, m * m * m, s * s * s);

        let r = 4.076_741_7 * l - 3.307_711_6 * m + 0.230_969_94 * s;
        let g = -1.268_438 * l + 2.609_757_4 * m - 0.341_319_38 * s;
        let b = -0.004_196_086_3 * l - 0.703_418_6 * m + 1.707_614_7 * s;

        [to_u8(r), to_u8(g), to_u8(b)]
    }
}

fn to_u8(linear: f32) -> u8 {
    (linear_to_srgb(linear.clamp(0.0, 1.0)) * 255.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Apply a [`Modulation`] to one sRGB pixel.
pub fn modulate(rgb: [u8; 3], modulation: &Modulation) -> [u8; 3] {
    let lab = Oklab::from_rgb8(rgb);
    let (sin, cos) = modulation.hue.to_radians().sin_cos();
    let sat = modulation.saturation;
    Oklab {
        l: lab.l * modulation.brightness,
        a: sat * (lab.a * cos - lab.b * sin),
        b: sat * (lab.a * sin + lab.b * cos),
    }
    .to_rgb8()
}

/// Build the gamma lookup table for 8-bit channels.
pub fn gamma_lut(gamma: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let exponent = 1.0 / gamma;
    for (i, slot) in lut.iter_mut().enumerate() {
        let v = (i as f32 / 255.0).powf(exponent) * 255.0;
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Modulate and gamma-correct a raw interleaved buffer with 3 or 4 channels.
fn adjust_buffer(buf: &mut [u8], channels: usize, modulation: &Modulation, gamma: f32) {
    let lut = (gamma != 1.0).then(|| gamma_lut(gamma));
    let skip_modulate = modulation.is_identity();
    for px in buf.chunks_exact_mut(channels) {
        let rgb = if skip_modulate {
            [px[0], px[1], px[2]]
        } else {
            modulate([px[0], px[1], px[2]], modulation)
        };
        let rgb = match &lut {
            Some(lut) => rgb.map(|c| lut[c as usize]),
            None => rgb,
        };
        px[..3].copy_from_slice(&rgb);
    }
}

/// Adjust a decoded image, keeping an alpha channel when the source has one.
///
/// The result is always 8 bits per channel.
pub fn adjust_image(img: DynamicImage, modulation: &Modulation, gamma: f32) -> DynamicImage {
    if img.color().has_alpha() {
        let mut rgba: RgbaImage = img.into_rgba8();
        adjust_buffer(&mut rgba, 4, modulation, gamma);
        DynamicImage::ImageRgba8(rgba)
    } else {
        let mut rgb: RgbImage = img.into_rgb8();
        adjust_buffer(&mut rgb, 3, modulation, gamma);
        DynamicImage::ImageRgb8(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[[u8; 3]] = &[
        [0, 0, 0],
        [255, 255, 255],
        [128, 128, 128],
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [34, 139, 34],
        [210, 180, 140],
        [12, 200, 250],
    ];

    fn luma(rgb: [u8; 3]) -> u32 {
        rgb.iter().map(|&c| c as u32).sum()
    }

    #[test]
    fn oklab_roundtrip_within_one_step() {
        for &rgb in SAMPLES {
            let back = Oklab::from_rgb8(rgb).to_rgb8();
            for c in 0..3 {
                assert!(
                    (back[c] as i32 - rgb[c] as i32).abs() <= 1,
                    "{rgb:?} → {back:?}"
                );
            }
        }
    }

    #[test]
    fn white_has_unit_lightness() {
        let lab = Oklab::from_rgb8([255, 255, 255]);
        assert!((lab.l - 1.0).abs() < 1e-3);
        assert!(lab.a.abs() < 1e-3 && lab.b.abs() < 1e-3);
    }

    #[test]
    fn identity_modulation_preserves_pixels() {
        for &rgb in SAMPLES {
            let out = modulate(rgb, &Modulation::identity());
            for c in 0..3 {
                assert!((out[c] as i32 - rgb[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn lower_brightness_darkens() {
        let m = Modulation {
            brightness: 0.75,
            ..Modulation::identity()
        };
        for &rgb in &SAMPLES[1..] {
            assert!(luma(modulate(rgb, &m)) < luma(rgb), "{rgb:?}");
        }
        assert_eq!(modulate([0, 0, 0], &m), [0, 0, 0]);
    }

    #[test]
    fn higher_brightness_lightens_midtones() {
        let m = Modulation {
            brightness: 1.2,
            ..Modulation::identity()
        };
        assert!(luma(modulate([128, 128, 128], &m)) > luma([128, 128, 128]));
    }

    #[test]
    fn zero_saturation_yields_gray() {
        let m = Modulation {
            saturation: 0.0,
            ..Modulation::identity()
        };
        let [r, g, b] = modulate([200, 40, 40], &m);
        assert!((r as i32 - g as i32).abs() <= 1);
        assert!((g as i32 - b as i32).abs() <= 1);
    }

    #[test]
    fn saturation_leaves_grays_alone() {
        let m = Modulation {
            saturation: 1.2,
            ..Modulation::identity()
        };
        let out = modulate([128, 128, 128], &m);
        for c in out {
            assert!((c as i32 - 128).abs() <= 1);
        }
    }

    #[test]
    fn gamma_one_is_identity() {
        let lut = gamma_lut(1.0);
        for (i, &v) in lut.iter().enumerate() {
            assert_eq!(v as usize, i);
        }
    }

    #[test]
    fn gamma_above_one_lifts_midtones_and_keeps_ends() {
        let lut = gamma_lut(1.2);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert!(lut[128] > 128);
    }

    #[test]
    fn adjust_image_keeps_alpha() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([100, 150, 200, 77]));
        let out = adjust_image(
            DynamicImage::ImageRgba8(img),
            &Modulation {
                brightness: 0.75,
                saturation: 1.2,
                hue: 0.0,
            },
            1.2,
        );
        let rgba = out.as_rgba8().unwrap();
        assert_eq!(rgba.get_pixel(0, 0)[3], 77);
    }

    #[test]
    fn adjust_image_rgb_stays_rgb() {
        let img = RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let out = adjust_image(DynamicImage::ImageRgb8(img), &Modulation::identity(), 1.0);
        assert!(out.as_rgb8().is_some());
        let px = out.as_rgb8().unwrap().get_pixel(1, 1).0;
        assert_eq!(px, [10, 20, 30]);
    }

    #[test]
    fn unit_gamma_output_is_modulation_alone() {
        let modulation = Modulation {
            brightness: 0.75,
            saturation: 1.2,
            hue: 0.0,
        };
        let img = RgbImage::from_fn(3, 3, |x, y| image::Rgb(SAMPLES[(y * 3 + x) as usize]));
        let out = adjust_image(DynamicImage::ImageRgb8(img), &modulation, 1.0);
        let out = out.as_rgb8().unwrap();
        for (i, &rgb) in SAMPLES.iter().enumerate() {
            let (x, y) = (i as u32 % 3, i as u32 / 3);
            assert_eq!(out.get_pixel(x, y).0, modulate(rgb, &modulation), "{rgb:?}");
        }
    }
}
