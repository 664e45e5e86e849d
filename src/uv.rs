use glam::Vec2;

use crate::mirror::Expansion;

#[derive(Debug, Clone, PartialEq)]
pub struct UvLayer {
    pub name: String,
    pub coords: Vec<Vec2>,
}

impl UvLayer {
    pub fn new(name: impl Into<String>, coords: Vec<Vec2>) -> Self {
        Self {
            name: name.into(),
            coords,
        }
    }
}

/// Per-axis factor that keeps UVs on the original texels of an expanded
/// texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvScale(pub Vec2);

impl UvScale {
    pub const IDENTITY: UvScale = UvScale(Vec2::ONE);

    pub fn new(
        original: (u32, u32),
        expanded: (u32, u32),
        extend_x: bool,
        extend_y: bool,
    ) -> Self {
        fn axis(extended: bool, original: u32, expanded: u32) -> f32 {
            if extended && expanded > 0 {
                original as f32 / expanded as f32
            } else {
                1.0
            }
        }
        UvScale(Vec2::new(
            axis(extend_x, original.0, expanded.0),
            axis(extend_y, original.1, expanded.1),
        ))
    }

    pub fn from_expansion<P: image::Pixel>(expansion: &Expansion<P>) -> Self {
        match expansion {
            Expansion::Unchanged => Self::IDENTITY,
            Expansion::Expanded {
                image,
                original_width,
                original_height,
                extend_x,
                extend_y,
            } => Self::new(
                (*original_width, *original_height),
                image.dimensions(),
                *extend_x,
                *extend_y,
            ),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Scales in place, with no wrapping or clamping of the result.
    pub fn apply(&self, coords: &mut [Vec2]) {
        for uv in coords.iter_mut() {
            *uv *= self.0;
        }
    }
}

/// Scales every layer, returning how many were touched. Empty layers are skipped.
pub fn remap_uv_layers(layers: &mut [UvLayer], scale: UvScale) -> usize {
    let mut touched = 0;
    for layer in layers.iter_mut() {
        if layer.coords.is_empty() {
            log::warn!("UV layer '{}' has no data, skipping", layer.name);
            continue;
        }
        scale.apply(&mut layer.coords);
        touched += 1;
    }
    touched
}
