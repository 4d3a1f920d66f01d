//! Local artwork cache
//!
//! Resolves a catalog record's artwork URL and persists the image under a
//! deterministic name, so repeated lookups for the same entry skip the
//! network entirely. Files are staged next to their target and renamed into
//! place; a failed download or write never leaves a partial file visible to
//! future lookups.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::api::{CatalogClient, CatalogError, CatalogQuery};

/// Fallback extension when the artwork URL carries none
pub const DEFAULT_EXTENSION: &str = "png";

/// Suffix for staging files awaiting the final rename
const STAGING_SUFFIX: &str = "part";

/// Errors that can occur while populating or reading the cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("record for '{name}' has no artwork reference")]
    ArtworkUnavailable { name: String },

    #[error("artwork download failed: {reason}")]
    DownloadFailed { status: Option<u16>, reason: String },

    #[error("cache write failed: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// A cached artwork image
#[derive(Debug, Clone)]
pub struct ArtworkAsset {
    /// Normalized entry name the image belongs to
    pub name: String,
    /// URL the image was downloaded from; `None` on a cache hit
    pub source_url: Option<String>,
    /// Local file the presentation layer can render
    pub path: PathBuf,
}

/// On-disk artwork store keyed by normalized entry name
#[derive(Debug, Clone)]
pub struct ArtworkCache {
    dir: PathBuf,
}

impl ArtworkCache {
    /// Open the cache directory, creating it if absent
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("Artwork cache at {}", dir.display());
        Ok(Self { dir })
    }

    /// Directory backing this cache
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch the artwork for `query`, downloading at most once per name.
    ///
    /// A cache hit returns the existing file without touching the network;
    /// a miss resolves the record, downloads the image, and persists it
    /// atomically before returning.
    pub fn get_artwork(
        &self,
        client: &CatalogClient,
        query: &CatalogQuery,
    ) -> Result<ArtworkAsset, CacheError> {
        if let Some(path) = self.find_cached(query.as_str()) {
            log::info!("Cache hit for '{}': {}", query, path.display());
            return Ok(ArtworkAsset {
                name: query.as_str().to_string(),
                source_url: None,
                path,
            });
        }

        let record = client.fetch_record(query)?;
        let url = record
            .artwork_url()
            .ok_or_else(|| CacheError::ArtworkUnavailable {
                name: query.as_str().to_string(),
            })?
            .to_string();

        let ext = extension_from_url(&url);
        let target = self.dir.join(format!("{}.{}", query.as_str(), ext));

        log::info!("Cache miss for '{}', downloading {}", query, url);
        let bytes = download(client, &url)?;
        self.write_atomic(&target, &bytes)?;

        log::info!("Cached artwork for '{}' at {}", query, target.display());
        Ok(ArtworkAsset {
            name: query.as_str().to_string(),
            source_url: Some(url),
            path: target,
        })
    }

    /// Look for an already-cached file for `name`, regardless of extension.
    ///
    /// Staging files never match: their extension is the staging suffix, so
    /// leftovers from a crashed run cannot satisfy a lookup.
    fn find_cached(&self, name: &str) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) == Some(STAGING_SUFFIX) {
                continue;
            }
            if path.file_stem().and_then(|s| s.to_str()) == Some(name) {
                return Some(path);
            }
        }
        None
    }

    /// Stage the payload next to the target, then rename into place.
    ///
    /// The file handle is closed and flushed before the rename on every exit
    /// path; any failure removes the staging file.
    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
        let staging = staging_path(target);

        let written = (|| -> std::io::Result<()> {
            let mut file = File::create(&staging)?;
            file.write_all(bytes)?;
            file.sync_all()
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(CacheError::WriteFailed(e));
        }

        if let Err(e) = fs::rename(&staging, target) {
            let _ = fs::remove_file(&staging);
            return Err(CacheError::WriteFailed(e));
        }

        Ok(())
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut file_name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    file_name.push(".");
    file_name.push(STAGING_SUFFIX);
    target.with_file_name(file_name)
}

/// Extension of the URL's final path segment, falling back to the default
fn extension_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext
        }
        _ => DEFAULT_EXTENSION,
    }
}

/// Download the artwork payload, classifying failures
fn download(client: &CatalogClient, url: &str) -> Result<Vec<u8>, CacheError> {
    let response = client.get_url(url).map_err(|e| CacheError::DownloadFailed {
        status: None,
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CacheError::DownloadFailed {
            status: Some(status.as_u16()),
            reason: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        });
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| CacheError::DownloadFailed {
            status: None,
            reason: e.to_string(),
        })
}
