/// Node colours for dark and light backgrounds.
use super::Rgba;
use serde::{Deserialize, Serialize};

/// The colours a layout assigns by entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub directory: Rgba,
    pub file: Rgba,
    pub symlink: Rgba,
    /// Special files, and files with no known modification time.
    pub other: Rgba,
    /// Directories that could not be read.
    pub error: Rgba,
}

impl Palette {
    /// Teal directories and amber files on a dark scene.
    pub const fn dark() -> Self {
        Self {
            directory: Rgba::rgb(60, 160, 170),
            file: Rgba::rgb(200, 155, 60),
            symlink: Rgba::rgb(170, 130, 210),
            other: Rgba::new(100, 100, 110, 180),
            error: Rgba::rgb(220, 70, 70),
        }
    }

    /// Deeper variants that keep contrast on a light scene.
    pub const fn light() -> Self {
        Self {
            directory: Rgba::rgb(40, 130, 140),
            file: Rgba::rgb(180, 120, 40),
            symlink: Rgba::rgb(120, 80, 170),
            other: Rgba::new(150, 150, 155, 200),
            error: Rgba::rgb(200, 60, 60),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
