//! Bakes MIRROR wrap modes into pixels.
//!
//! A texture that mirrors along an axis is doubled along that axis, the new
//! half holding the flipped original. Sampled with CLAMP, the doubled canvas
//! looks like one period of mirrored repeat.

use std::fmt;

use image::{ImageBuffer, Pixel, Rgba32FImage};

use crate::wrap_mode::WrapPair;

/// RGBA float raster, row-major, origin top-left.
pub type RasterBuffer = Rgba32FImage;

#[derive(Clone)]
pub enum Expansion<P: Pixel> {
    /// Neither axis mirrors.
    Unchanged,
    Expanded {
        image: ImageBuffer<P, Vec<P::Subpixel>>,
        original_width: u32,
        original_height: u32,
        extend_x: bool,
        extend_y: bool,
    },
}

impl<P: Pixel> fmt::Debug for Expansion<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expansion::Unchanged => f.write_str("Unchanged"),
            Expansion::Expanded {
                image,
                original_width,
                original_height,
                ..
            } => write!(
                f,
                "Expanded({}x{} -> {}x{})",
                original_width,
                original_height,
                image.width(),
                image.height()
            ),
        }
    }
}

impl<P: Pixel> Expansion<P> {
    pub fn is_expanded(&self) -> bool {
        matches!(self, Expansion::Expanded { .. })
    }
}

/// Returns a new raster whose extra columns and rows are mirrored copies of
/// `source`. The source is never modified. Empty rasters are left unchanged.
pub fn mirror_expand<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    wraps: WrapPair,
) -> Expansion<P> {
    let extend_x = wraps.extends_x();
    let extend_y = wraps.extends_y();
    if !extend_x && !extend_y {
        return Expansion::Unchanged;
    }

    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        log::warn!("cannot mirror an empty {}x{} image, leaving it as is", width, height);
        return Expansion::Unchanged;
    }
    let new_width = if extend_x { width * 2 } else { width };
    let new_height = if extend_y { height * 2 } else { height };

    let channels = P::CHANNEL_COUNT as usize;
    let (w, h, nw) = (width as usize, height as usize, new_width as usize);
    let row_len = nw * channels;
    let src: &[P::Subpixel] = source.as_raw();

    let mut expanded = ImageBuffer::<P, Vec<P::Subpixel>>::new(new_width, new_height);
    {
        let dst: &mut [P::Subpixel] = &mut expanded;
        for y in 0..h {
            for x in 0..w {
                let from = (y * w + x) * channels;
                let pixel = &src[from..from + channels];

                let to = (y * nw + x) * channels;
                dst[to..to + channels].copy_from_slice(pixel);

                if extend_x {
                    let mirrored = (y * nw + (2 * w - x - 1)) * channels;
                    dst[mirrored..mirrored + channels].copy_from_slice(pixel);
                }
            }

            // the row is complete along x now, so the flipped row carries the
            // mirrored corner as well
            if extend_y {
                let row = y * row_len;
                let mirrored = (2 * h - y - 1) * row_len;
                dst.copy_within(row..row + row_len, mirrored);
            }
        }
    }

    Expansion::Expanded {
        image: expanded,
        original_width: width,
        original_height: height,
        extend_x,
        extend_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap_mode::WrapMode;
    use image::{Rgba, RgbaImage};
    use proptest::prelude::*;

    fn quad() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 1 + x as u8 + 2 * y as u8, 255]))
    }

    fn expand(image: &RgbaImage, s: WrapMode, t: WrapMode) -> RgbaImage {
        match mirror_expand(image, WrapPair::new(s, t)) {
            Expansion::Expanded { image, .. } => image,
            Expansion::Unchanged => panic!("expected an expansion"),
        }
    }

    #[test]
    fn no_mirror_is_unchanged() {
        let result = mirror_expand(&quad(), WrapPair::new(WrapMode::Clamp, WrapMode::Repeat));
        assert!(matches!(result, Expansion::Unchanged));
        assert!(!result.is_expanded());
    }

    #[test]
    fn empty_image_is_unchanged() {
        let empty = RgbaImage::new(0, 3);
        let result = mirror_expand(&empty, WrapPair::new(WrapMode::Mirror, WrapMode::Mirror));
        assert!(matches!(result, Expansion::Unchanged));
    }

    #[test]
    fn mirrors_columns() {
        let source = quad();
        let expanded = expand(&source, WrapMode::Mirror, WrapMode::Repeat);
        assert_eq!(expanded.dimensions(), (4, 2));
        for y in 0..2 {
            assert_eq!(expanded.get_pixel(0, y), source.get_pixel(0, y));
            assert_eq!(expanded.get_pixel(1, y), source.get_pixel(1, y));
            assert_eq!(expanded.get_pixel(2, y), source.get_pixel(1, y));
            assert_eq!(expanded.get_pixel(3, y), source.get_pixel(0, y));
        }
    }

    #[test]
    fn mirrors_rows() {
        let source = quad();
        let expanded = expand(&source, WrapMode::Repeat, WrapMode::Mirror);
        assert_eq!(expanded.dimensions(), (2, 4));
        for x in 0..2 {
            assert_eq!(expanded.get_pixel(x, 2), source.get_pixel(x, 1));
            assert_eq!(expanded.get_pixel(x, 3), source.get_pixel(x, 0));
        }
    }

    #[test]
    fn mirrors_corner_on_both_axes() {
        let source = quad();
        let expanded = expand(&source, WrapMode::Mirror, WrapMode::Mirror);
        assert_eq!(expanded.dimensions(), (4, 4));
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(
                    expanded.get_pixel(2 + x, 2 + y),
                    source.get_pixel(1 - x, 1 - y)
                );
            }
        }
        // the top-right quadrant flipped vertically, not the bare top-left
        assert_eq!(expanded.get_pixel(3, 3), &Rgba([0, 0, 1, 255]));
        assert_eq!(expanded.get_pixel(2, 3), &Rgba([10, 0, 2, 255]));
    }

    #[test]
    fn leaves_source_untouched() {
        let source = quad();
        let before = source.clone();
        let _ = expand(&source, WrapMode::Mirror, WrapMode::Mirror);
        assert_eq!(source, before);
    }

    #[test]
    fn works_on_float_rasters() {
        let source = RasterBuffer::from_fn(3, 1, |x, _| Rgba([x as f32, 0.5, 0.0, 1.0]));
        let expanded = match mirror_expand(&source, WrapPair::new(WrapMode::Mirror, WrapMode::Clamp)) {
            Expansion::Expanded { image, original_width, extend_x, extend_y, .. } => {
                assert_eq!(original_width, 3);
                assert!(extend_x && !extend_y);
                image
            }
            Expansion::Unchanged => panic!("expected an expansion"),
        };
        let column_reds: Vec<f32> = (0..6).map(|x| expanded.get_pixel(x, 0)[0]).collect();
        assert_eq!(column_reds, vec![0.0, 1.0, 2.0, 2.0, 1.0, 0.0]);
    }

    fn fold(coord: u32, size: u32) -> u32 {
        if coord < size { coord } else { 2 * size - coord - 1 }
    }

    proptest! {
        #[test]
        fn every_texel_folds_back_to_its_source(
            width in 1u32..7,
            height in 1u32..7,
            mirror_s in any::<bool>(),
            mirror_t in any::<bool>(),
            seed in any::<u8>(),
        ) {
            let source = RgbaImage::from_fn(width, height, |x, y| {
                Rgba([x as u8, y as u8, seed, (x * 7 + y * 13) as u8])
            });
            let mode = |m: bool| if m { WrapMode::Mirror } else { WrapMode::Repeat };
            match mirror_expand(&source, WrapPair::new(mode(mirror_s), mode(mirror_t))) {
                Expansion::Unchanged => prop_assert!(!mirror_s && !mirror_t),
                Expansion::Expanded { image, .. } => {
                    let expect_w = if mirror_s { width * 2 } else { width };
                    let expect_h = if mirror_t { height * 2 } else { height };
                    prop_assert_eq!(image.dimensions(), (expect_w, expect_h));
                    for (x, y, pixel) in image.enumerate_pixels() {
                        prop_assert_eq!(pixel, source.get_pixel(fold(x, width), fold(y, height)));
                    }
                }
            }
        }
    }
}
