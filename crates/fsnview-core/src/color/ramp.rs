/// Age and size colour ramps.
///
/// The treemap paints files by how recently they were modified; the
/// pedestal layout paints files by size relative to their largest sibling.
use super::{hsv_to_rgba, Palette, Rgba};
use std::time::{Duration, SystemTime};

const DAY: u64 = 24 * 60 * 60;

/// An upper age bound and the colour for files at or below it.
#[derive(Debug, Clone, Copy)]
pub struct AgeBucket {
    pub max_age: Duration,
    pub color: Rgba,
}

/// Age buckets, newest first. Anything older gets [`ANCIENT`].
pub const AGE_BUCKETS: [AgeBucket; 6] = [
    AgeBucket {
        max_age: Duration::from_secs(DAY),
        color: Rgba::rgb(100, 210, 100),
    },
    AgeBucket {
        max_age: Duration::from_secs(7 * DAY),
        color: Rgba::rgb(140, 200, 80),
    },
    AgeBucket {
        max_age: Duration::from_secs(30 * DAY),
        color: Rgba::rgb(200, 195, 60),
    },
    AgeBucket {
        max_age: Duration::from_secs(180 * DAY),
        color: Rgba::rgb(210, 170, 50),
    },
    AgeBucket {
        max_age: Duration::from_secs(365 * DAY),
        color: Rgba::rgb(200, 120, 55),
    },
    AgeBucket {
        max_age: Duration::from_secs(3 * 365 * DAY),
        color: Rgba::rgb(170, 80, 60),
    },
];

/// Steel blue for files older than every bucket.
pub const ANCIENT: Rgba = Rgba::rgb(70, 100, 160);

/// Colour for a modification time, relative to now.
///
/// No timestamp maps to the palette's `other` colour. Timestamps in the
/// future (clock skew) count as brand new.
pub fn color_from_age(modified: Option<SystemTime>, palette: &Palette) -> Rgba {
    let Some(modified) = modified else {
        return palette.other;
    };

    let age = match SystemTime::now().duration_since(modified) {
        Ok(age) => age,
        Err(_) => return AGE_BUCKETS[0].color,
    };

    AGE_BUCKETS
        .iter()
        .find(|bucket| age <= bucket.max_age)
        .map(|bucket| bucket.color)
        .unwrap_or(ANCIENT)
}

/// Colour for `size` relative to `max_size` on a logarithmic ramp:
/// teal for the smallest files, amber in the middle, red at the maximum.
///
/// `max_size == 0` (no sized siblings) maps to the palette's file colour.
pub fn color_from_size(size: u64, max_size: u64, palette: &Palette) -> Rgba {
    if max_size == 0 {
        return palette.file;
    }

    let t = ((size as f64).ln_1p() / (max_size as f64).ln_1p()).clamp(0.0, 1.0);

    let hue = if t < 0.5 {
        180.0 - (t / 0.5) * 140.0
    } else {
        40.0 - ((t - 0.5) / 0.5) * 40.0
    };
    let saturation = 0.55 + t * 0.2;
    let value = 0.75 + (1.0 - t) * 0.1;

    hsv_to_rgba(hue, saturation, value)
}
