//! Raw file download layer.
//!
//! Implements the download-or-reuse pattern for upstream source files.
//! A file already on disk is returned without touching the network,
//! otherwise the response body is streamed to a partial file and
//! renamed into place once complete.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use crate::constants::PARTIAL_SUFFIX;
use crate::error::{DataError, Result};

/// Options controlling where a downloaded file lands and whether an
/// existing copy is replaced.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Target directory. The current working directory is used when unset.
    pub dir: Option<PathBuf>,

    /// Target filename. Derived from the URL path when unset.
    pub file_name: Option<String>,

    /// Replace an existing file instead of reusing it.
    pub overwrite: bool,
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory the file is saved into.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Override the URL-derived filename.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Re-download even if the file already exists.
    pub fn with_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

/// Download `url` into the configured directory, creating missing
/// directories along the way.
///
/// Returns the path of the downloaded file. An existing file
/// short-circuits the download unless `overwrite` is set, so repeated
/// calls hit the network at most once.
pub fn download_file(client: &Client, url: &str, options: &DownloadOptions) -> Result<PathBuf> {
    let dir = options.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    if !dir.exists() {
        debug!("Creating directory: {}", dir.display());
        fs::create_dir_all(&dir)?;
    }

    let file_name = match &options.file_name {
        Some(name) => name.clone(),
        None => file_name_from_url(url)?,
    };
    let target = dir.join(file_name);

    if !options.overwrite && target.exists() {
        debug!("File already exists at {}", target.display());
        return Ok(target);
    }

    let mut response = client.get(url).send()?.error_for_status()?;

    // Stream to a partial file, renamed into place once complete
    let partial = partial_path(&target);
    let mut file = fs::File::create(&partial)?;
    let bytes = match response.copy_to(&mut file) {
        Ok(bytes) => bytes,
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
    };
    drop(file);

    fs::rename(&partial, &target).map_err(|e| {
        let _ = fs::remove_file(&partial);
        DataError::Io(e)
    })?;

    info!("Downloaded {} bytes to {}", bytes, target.display());
    Ok(target)
}

/// Derive the target filename from the final segment of the URL path.
///
/// Query strings are not part of the path, so `.../codes.xls?v=4919.6`
/// yields `codes.xls`.
pub(crate) fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| DataError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    if name.is_empty() {
        return Err(DataError::InvalidUrl {
            url: url.to_string(),
            reason: "no file name in URL path".to_string(),
        });
    }

    Ok(name.to_string())
}

pub(crate) fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
