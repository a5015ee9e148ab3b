//! Full-screen capture using xcap, for diagnostics when the desktop flow
//! fails.

use std::path::Path;

use anyhow::anyhow;
use image::RgbaImage;
use xcap::Monitor;

use crate::error::Result;

/// Screen capture utilities
pub struct ScreenCapture;

impl ScreenCapture {
    /// Capture the primary monitor, or the first one when the platform does
    /// not flag a primary.
    pub fn capture_primary_screen() -> Result<RgbaImage> {
        let monitors = Monitor::all().map_err(|e| anyhow!("failed to get monitors: {}", e))?;

        let monitor = monitors
            .into_iter()
            .reduce(|best, m| if m.is_primary() { m } else { best })
            .ok_or_else(|| anyhow!("no monitors found"))?;

        let image = monitor
            .capture_image()
            .map_err(|e| anyhow!("failed to capture screen: {}", e))?;

        Ok(image)
    }

    /// Encode an image as a PNG file at `path`.
    pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
        use image::ImageEncoder;
        use std::io::Cursor;

        let mut buffer = Cursor::new(Vec::new());
        let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
        encoder
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| anyhow!("failed to encode PNG: {}", e))?;

        std::fs::write(path, buffer.into_inner())?;
        Ok(())
    }

    /// Capture the primary monitor straight to a PNG file.
    pub fn capture_to_file(path: &Path) -> Result<()> {
        let image = Self::capture_primary_screen()?;
        Self::save_png(&image, path)
    }
}
