//! Sharpness enhancement.
//!
//! The image is blended with a smoothed copy of itself:
//!
//! ```text
//! out = smooth + factor * (image - smooth)
//! ```
//!
//! `factor = 1.0` reproduces the image exactly, `factor > 1.0` pushes every
//! pixel away from its local average and so raises edge contrast. The
//! smoothing kernel is a 3×3 centre-weighted box (`[1 1 1; 1 5 1; 1 1 1] / 13`).
//! Border pixels have no full neighbourhood and are left untouched, as is the
//! alpha channel.

use image::{DynamicImage, ImageBuffer, Pixel};

const SMOOTH_KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
const SMOOTH_DIVISOR: f32 = 13.0;

/// Integer channel types the filter can write back to.
trait Channel: Copy + Into<f32> {
    fn from_f32(value: f32) -> Self;
}

impl Channel for u8 {
    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, f32::from(u8::MAX)) as u8
    }
}

impl Channel for u16 {
    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, f32::from(u16::MAX)) as u16
    }
}

/// Apply sharpness enhancement with the given factor.
///
/// 8- and 16-bit images keep their color type. Anything else (float
/// rasters) is converted to RGBA8 first.
pub fn enhance_sharpness(img: DynamicImage, factor: f32) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(enhance(&buf, factor, false)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(enhance(&buf, factor, true)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(enhance(&buf, factor, false)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(enhance(&buf, factor, true)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(enhance(&buf, factor, false)),
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(enhance(&buf, factor, true))
        }
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(enhance(&buf, factor, false)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(enhance(&buf, factor, true)),
        other => DynamicImage::ImageRgba8(enhance(&other.to_rgba8(), factor, true)),
    }
}

fn enhance<P>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    factor: f32,
    has_alpha: bool,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
    P::Subpixel: Channel,
{
    let (width, height) = src.dimensions();
    let mut out = src.clone();
    if width < 3 || height < 3 {
        return out;
    }

    let channels = usize::from(P::CHANNEL_COUNT);
    let colour_channels = if has_alpha { channels - 1 } else { channels };

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0.0f32; 4];
            for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let neighbour = src.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1);
                    for (sum, value) in sums
                        .iter_mut()
                        .zip(neighbour.channels())
                        .take(colour_channels)
                    {
                        *sum += weight * (*value).into();
                    }
                }
            }

            let original = src.get_pixel(x, y).channels();
            let target = out.get_pixel_mut(x, y).channels_mut();
            for c in 0..colour_channels {
                let smooth = (sums[c] / SMOOTH_DIVISOR).round();
                let value: f32 = original[c].into();
                target[c] = Channel::from_f32(smooth + factor * (value - smooth));
            }
        }
    }

    out
}
