//! Image path resolution.
//!
//! An image destination is looked up under the local path prefix first and,
//! failing that, under the alternative prefix, where images are stored at
//! three times the resolution.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// DPI multiplier applied to images found under the alternative prefix.
pub const ALTERNATIVE_DPI_MULTIPLIER: f64 = 3.0;

/// Answers whether image files exist and can be opened.
pub trait ImageLocator {
    fn exists(&self, path: &Path) -> bool;
    fn can_open(&self, path: &Path) -> bool;
}

/// Looks images up on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocator;

impl ImageLocator for FsLocator {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn can_open(&self, path: &Path) -> bool {
        // The handle is dropped before returning.
        File::open(path).is_ok_and(|file| file.metadata().is_ok_and(|m| m.is_file()))
    }
}

/// A destination that resolved to an openable file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub path: PathBuf,
    pub multiply_dpi: Option<f64>,
}

/// Resolve `destination` against the primary and alternative prefixes.
///
/// # Errors
/// Returns the last candidate path when no candidate can be opened.
pub fn resolve_image(
    locator: &impl ImageLocator,
    local_prefix: &str,
    alternative_prefix: &str,
    destination: &str,
) -> Result<ResolvedImage, PathBuf> {
    let mut candidate = format!("{local_prefix}{destination}");
    let mut multiply_dpi = None;
    if !locator.exists(Path::new(&candidate)) {
        multiply_dpi = Some(ALTERNATIVE_DPI_MULTIPLIER);
        candidate = format!("{alternative_prefix}{destination}");
    }
    let path = clean_path(&candidate);
    if locator.can_open(&path) {
        Ok(ResolvedImage { path, multiply_dpi })
    } else {
        Err(path)
    }
}

/// Lexically normalize a path: drop `.`, fold `dir/..`, collapse separators.
pub fn clean_path(path: &str) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
