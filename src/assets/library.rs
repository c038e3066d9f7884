use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::SlidecastResult;

/// Similarity at or above which a fuzzy match is taken silently.
pub const PREFERRED_SIMILARITY: f64 = 0.6;
/// Similarity at or above which a fuzzy match is still accepted, with a warning.
pub const ACCEPTED_SIMILARITY: f64 = 0.1;

/// Immutable, sorted registry of media files addressed by filename.
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    entries: Vec<PathBuf>,
}

/// How a reference was resolved against an [`AssetLibrary`].
#[derive(Clone, Debug, PartialEq)]
pub enum AssetMatch {
    /// File name matched exactly.
    Exact(PathBuf),
    /// Stem matched, ignoring case and extension.
    Stem(PathBuf),
    /// Closest entry by similarity ratio.
    Similar {
        /// Chosen entry.
        path: PathBuf,
        /// Similarity ratio in `[0, 1]`.
        score: f64,
    },
    /// Nothing matched well enough; the first entry of the library.
    Fallback(PathBuf),
}

impl AssetMatch {
    /// The resolved file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Exact(p) | Self::Stem(p) | Self::Fallback(p) => p,
            Self::Similar { path, .. } => path,
        }
    }

    /// Consume the match, keeping only the resolved file.
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Exact(p) | Self::Stem(p) | Self::Fallback(p) => p,
            Self::Similar { path, .. } => path,
        }
    }
}

impl AssetLibrary {
    /// Scan `dir` (non-recursive) for files with one of `extensions` (case-insensitive).
    ///
    /// A missing directory yields an empty library.
    pub fn scan(dir: &Path, extensions: &[&str]) -> SlidecastResult<Self> {
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "asset directory missing");
            return Ok(Self::default());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read asset directory '{}'", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("read entry of '{}'", dir.display()))?
                .path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if matches && path.is_file() {
                entries.push(path);
            }
        }
        Ok(Self::from_paths(entries))
    }

    /// Library over an explicit file list, sorted and deduplicated.
    pub fn from_paths(mut entries: Vec<PathBuf>) -> Self {
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    /// Whether the library holds no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files in sorted order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Resolve `requested` by exact filename, then case-insensitive stem, then similarity.
    ///
    /// Anything else falls back to the first entry. Returns `None` only for an empty library.
    pub fn resolve(&self, requested: &str) -> Option<AssetMatch> {
        let first = self.entries.first()?;
        let requested = requested.trim();
        let req_name = Path::new(requested)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(requested);

        if let Some(p) = self.entries.iter().find(|p| file_name(p) == req_name) {
            return Some(AssetMatch::Exact(p.clone()));
        }

        let req_stem = stem_lower(Path::new(req_name));
        if let Some(p) = self.entries.iter().find(|p| stem_lower(p) == req_stem) {
            return Some(AssetMatch::Stem(p.clone()));
        }

        let best = self
            .entries
            .iter()
            .map(|p| (p, similarity(&req_stem, &stem_lower(p))))
            .fold(None::<(&PathBuf, f64)>, |best, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        if let Some((path, score)) = best
            && score >= ACCEPTED_SIMILARITY
        {
            return Some(AssetMatch::Similar {
                path: path.clone(),
                score,
            });
        }
        Some(AssetMatch::Fallback(first.clone()))
    }

    /// [`resolve`](Self::resolve) plus logging of imprecise matches.
    pub fn resolve_logged(&self, kind: &str, requested: &str) -> Option<PathBuf> {
        let Some(found) = self.resolve(requested) else {
            tracing::warn!(kind, requested, "asset library is empty");
            return None;
        };
        match &found {
            AssetMatch::Exact(_) | AssetMatch::Stem(_) => {}
            AssetMatch::Similar { path, score } if *score >= PREFERRED_SIMILARITY => {
                tracing::debug!(kind, requested, path = %path.display(), score, "fuzzy asset match");
            }
            AssetMatch::Similar { path, score } => {
                tracing::warn!(kind, requested, path = %path.display(), score, "weak asset match");
            }
            AssetMatch::Fallback(path) => {
                tracing::warn!(kind, requested, path = %path.display(), "no asset match, using first entry");
            }
        }
        Some(found.into_path())
    }
}

fn file_name(p: &Path) -> &str {
    p.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn stem_lower(p: &Path) -> String {
    p.file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Ratcliff/Obershelp similarity in `[0, 1]`: twice the matched characters over the total length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_chars(&a[..ai], &b[..bi]) + matched_chars(&a[ai + len..], &b[bi + len..])
}

// Earliest longest run, matching difflib's tie-breaking.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                cur[j + 1] = prev[j] + 1;
                if cur[j + 1] > best.2 {
                    best = (i + 1 - cur[j + 1], j + 1 - cur[j + 1], cur[j + 1]);
                }
            }
        }
        prev = cur;
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/assets/library.rs"]
mod tests;
