/// Colour values and the ramps the layouts paint with.
///
/// The layouts only pick colours; turning them into materials is the
/// renderer's job. Theme *detection* is also left to the caller, which picks
/// a [`Palette`] and passes it in through the layout options.
pub mod palette;
pub mod ramp;

pub use palette::Palette;
pub use ramp::{color_from_age, color_from_size, AgeBucket, AGE_BUCKETS};

use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Convert HSV (hue in degrees, saturation and value in `0.0..=1.0`) to an
/// opaque colour. Hue wraps.
pub fn hsv_to_rgba(hue: f64, saturation: f64, value: f64) -> Rgba {
    let h = hue.rem_euclid(360.0);
    let c = value * saturation;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0) as u8;
    Rgba::rgb(channel(r), channel(g), channel(b))
}
