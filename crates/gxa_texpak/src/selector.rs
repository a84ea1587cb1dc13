//! Discovery of texture files and the choice of which variants to pack.
//!
//! A dump usually holds several variants of the same texture. The selector keeps
//! the most complete one:
//!
//! 1. every `_all.png`;
//! 2. `_rgb.png` and `_a.png` files, unless an `_all.png` with the same prefix
//!    was kept;
//! 3. every `_ciByRGBA.png`.
//!
//! Retained `_rgb.png` files are then paired with the retained `_a.png` sharing
//! their prefix. `_a.png` files are never packed on their own.

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::metadata::TextureKind;

/// One texture to convert: a primary image and, for `_rgb.png`, its alpha mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureJob {
    pub primary: Utf8PathBuf,
    pub alpha: Option<Utf8PathBuf>,
}

impl TextureJob {
    pub fn file_name(&self) -> &str {
        self.primary.file_name().unwrap_or(self.primary.as_str())
    }
}

/// Outcome of [`select_textures`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Textures to pack, in selection order.
    pub jobs: Vec<TextureJob>,
    /// Retained `_a.png` files that no `_rgb.png` claimed.
    pub orphaned_alpha: Vec<Utf8PathBuf>,
}

/// Recursively collect every file under `dir` that may be a texture.
///
/// Candidates are non-empty regular files whose name ends in `.png` and
/// contains `#`. Entries are visited in name order so the result does not
/// depend on the filesystem. Symlinks are not followed, and entries that
/// cannot be read are skipped.
pub fn collect_candidates(dir: impl AsRef<Utf8Path>) -> Result<Vec<Utf8PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("texture directory not found: {dir}"),
        )));
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir.as_std_path()).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".png") || !name.contains('#') {
            continue;
        }
        if !entry.metadata().is_ok_and(|metadata| metadata.len() > 0) {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|path| Error::NonUtf8Path(path.display().to_string()))?;
        candidates.push(path);
    }

    tracing::info!("Found {} possible textures", candidates.len());
    Ok(candidates)
}

/// Apply the variant precedence rules to a candidate list.
pub fn select_textures(candidates: &[Utf8PathBuf]) -> Selection {
    let classified: Vec<(&Utf8PathBuf, &str, Option<TextureKind>)> = candidates
        .iter()
        .map(|path| {
            let name = path.file_name().unwrap_or(path.as_str());
            (path, name, TextureKind::from_file_name(name))
        })
        .collect();

    let all_prefixes: Vec<String> = classified
        .iter()
        .filter(|(_, _, kind)| *kind == Some(TextureKind::All))
        .map(|(_, name, _)| prefix(name).to_ascii_lowercase())
        .collect();

    let mut retained: Vec<(&Utf8PathBuf, &str, TextureKind)> = Vec::new();
    for &(path, name, ref kind) in &classified {
        if *kind == Some(TextureKind::All) {
            retained.push((path, name, TextureKind::All));
        }
    }
    for &(path, name, ref kind) in &classified {
        if let Some(kind @ (TextureKind::Rgb | TextureKind::Alpha)) = kind {
            if all_prefixes.contains(&prefix(name).to_ascii_lowercase()) {
                tracing::debug!("Skipping {name}, superseded by an _all.png");
                continue;
            }
            retained.push((path, name, kind.clone()));
        }
    }
    for &(path, name, ref kind) in &classified {
        if *kind == Some(TextureKind::CiByRgba) {
            retained.push((path, name, TextureKind::CiByRgba));
        }
    }

    let mut paired = vec![false; retained.len()];
    let mut jobs = Vec::new();
    for (path, name, kind) in &retained {
        let alpha = match kind {
            TextureKind::Alpha => continue,
            TextureKind::Rgb => {
                let wanted = format!("{}_a.png", prefix(name));
                let found = retained
                    .iter()
                    .rposition(|(_, other, kind)| {
                        *kind == TextureKind::Alpha && other.eq_ignore_ascii_case(&wanted)
                    });
                found.map(|i| {
                    paired[i] = true;
                    retained[i].0.clone()
                })
            }
            _ => None,
        };
        if let Some(alpha) = &alpha {
            tracing::debug!("Pairing {name} with {alpha}");
        }
        jobs.push(TextureJob {
            primary: (*path).clone(),
            alpha,
        });
    }

    let orphaned_alpha: Vec<Utf8PathBuf> = retained
        .iter()
        .zip(&paired)
        .filter(|((_, _, kind), paired)| *kind == TextureKind::Alpha && !**paired)
        .map(|((path, _, _), _)| (*path).clone())
        .collect();
    for path in &orphaned_alpha {
        tracing::warn!("Alpha image {path} has no matching _rgb.png and will not be packed");
    }

    Selection {
        jobs,
        orphaned_alpha,
    }
}

/// File name up to its last `_`.
fn prefix(name: &str) -> &str {
    name.rsplit_once('_').map_or(name, |(prefix, _)| prefix)
}

/// Collect candidates from `dir` and select which to pack.
pub fn select_directory(dir: impl AsRef<Utf8Path>) -> Result<Selection> {
    Ok(select_textures(&collect_candidates(dir)?))
}
