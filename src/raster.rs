//! PDF page rasterization.

use crate::error::{Error, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders a single PDF page to an image.
pub trait PageRasterizer: Send + Sync {
    /// Render page `page` (1-indexed) of `pdf` at `dpi`.
    fn rasterize(&self, pdf: &Path, page: u32, dpi: u32) -> Result<DynamicImage>;
}

/// Rasterizer that shells out to poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
        }
    }

    /// Use a specific `pdftoppm` executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check whether the executable can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|_| true)
            .unwrap_or(false)
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        let out_dir = tempfile::tempdir()?;
        let prefix = out_dir.path().join("page");
        let page_arg = page.to_string();
        let dpi_arg = dpi.to_string();

        let output = Command::new(&self.binary)
            .arg("-png")
            .args(["-r", dpi_arg.as_str()])
            .args(["-f", page_arg.as_str(), "-l", page_arg.as_str()])
            .arg("-singlefile")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| {
                Error::Rasterize(format!(
                    "failed to execute {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Rasterize(format!(
                "pdftoppm failed on page {}: {}",
                page,
                stderr.trim()
            )));
        }

        let png = prefix.with_extension("png");
        if !png.exists() {
            return Err(Error::Rasterize(format!("pdftoppm produced no image for page {}", page)));
        }

        let image = image::open(&png)?;
        log::debug!(
            "Rasterized page {} at {} dpi: {}x{}",
            page,
            dpi,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_rasterize_error() {
        let rasterizer = PdftoppmRasterizer::with_binary("/nonexistent/pdftoppm");
        assert!(!rasterizer.is_available());
        let err = rasterizer
            .rasterize(Path::new("missing.pdf"), 1, 72)
            .unwrap_err();
        assert!(matches!(err, Error::Rasterize(_)));
    }
}
