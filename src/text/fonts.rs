use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::foundation::error::{SlidecastError, SlidecastResult};

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Font files available for slide text, scanned once per batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontPool {
    fonts: Vec<PathBuf>,
}

impl FontPool {
    /// Collect `.ttf`/`.otf` files in `dir`, sorted by name. A missing directory gives an empty
    /// pool; rendering any text with it fails later.
    pub fn scan(dir: &Path) -> Self {
        let fonts = list_font_files(dir);
        if fonts.is_empty() {
            tracing::warn!(path = %dir.display(), "no fonts found");
        }
        Self { fonts }
    }

    /// Pool from explicit paths.
    pub fn from_paths(fonts: Vec<PathBuf>) -> Self {
        Self { fonts }
    }

    /// Font files in the pool.
    pub fn paths(&self) -> &[PathBuf] {
        &self.fonts
    }

    /// Pick one font at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SlidecastResult<&Path> {
        self.fonts
            .choose(rng)
            .map(PathBuf::as_path)
            .ok_or_else(|| SlidecastError::font("font pool is empty"))
    }
}

/// One font path per slide.
///
/// With `consistent` every slide gets the same randomly chosen font; otherwise each slide draws
/// its own. An empty pool is fatal unless there are no slides.
pub fn choose_slide_fonts<R: Rng + ?Sized>(
    pool: &FontPool,
    slide_count: usize,
    consistent: bool,
    rng: &mut R,
) -> SlidecastResult<Vec<PathBuf>> {
    if slide_count == 0 {
        return Ok(Vec::new());
    }
    if consistent {
        let font = pool.pick(rng)?.to_path_buf();
        tracing::debug!(font = %font.display(), "using one font for the whole scenario");
        return Ok(vec![font; slide_count]);
    }
    (0..slide_count)
        .map(|i| {
            let font = pool.pick(rng)?.to_path_buf();
            tracing::debug!(slide = i + 1, font = %font.display(), "picked slide font");
            Ok(font)
        })
        .collect()
}

/// Locate the emoji font.
///
/// A configured name must exist in `dir`; without one the first `*Noto*Emoji*` font wins, then any
/// font in the directory.
pub fn find_emoji_font(dir: &Path, configured: Option<&str>) -> Option<PathBuf> {
    if let Some(name) = configured {
        let p = dir.join(name);
        if p.is_file() {
            return Some(p);
        }
        tracing::warn!(path = %p.display(), "configured emoji font not found");
        return None;
    }
    let fonts = list_font_files(dir);
    fonts
        .iter()
        .find(|p| {
            let name = p
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            name.contains("noto") && name.contains("emoji")
        })
        .or_else(|| fonts.first())
        .cloned()
}

/// Font file contents.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    /// Source path.
    pub path: PathBuf,
    /// Raw font bytes.
    pub bytes: Arc<Vec<u8>>,
}

impl LoadedFont {
    /// Read a font file; failure is a font error.
    pub fn load(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SlidecastError::font(format!("failed to read font '{}': {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(SlidecastError::font(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            bytes: Arc::new(bytes),
        })
    }
}

fn list_font_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| {
                        FONT_EXTENSIONS
                            .iter()
                            .any(|want| ext.eq_ignore_ascii_case(want))
                    })
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
