//! Download manager: single zip fetches and flat concurrent batches.
//!
//! The resolver drives the single-fetch path sequentially, one dependency
//! edge at a time. [`download_many`] exists for flat, non-dependent batches
//! (e.g. re-fetching a known list) and runs on a bounded worker pool.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::InstallError;
use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Maps a download URL to the file name (without extension) it lands under.
pub type DownloadPool = HashMap<String, String>;

/// Default concurrency ceiling for batch downloads.
pub const DEFAULT_DOWNLOAD_LIMIT: usize = 4;

/// The destination for a download is already occupied.
///
/// Raised before any network I/O happens; this is the idempotence mechanism
/// behind "already installed".
#[derive(Debug)]
pub struct AlreadyExists(pub PathBuf);

impl fmt::Display for AlreadyExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file or directory already exists: {:?}", self.0)
    }
}

impl std::error::Error for AlreadyExists {}

/// Returns the on-disk path a zip for `file_name` is downloaded to.
pub fn zip_path(dest_dir: &Path, file_name: &str) -> PathBuf {
    dest_dir.join(format!("{}.zip", file_name))
}

/// Fetches one zip artifact into `dest_dir` under `<file_name>.zip`.
///
/// Fails with [`AlreadyExists`] before the network call if either the zip or
/// an extracted entry directory of the same name is already present.
/// Returns the number of bytes written.
#[tracing::instrument(skip(runtime, http))]
pub async fn download_zip<R: Runtime>(
    runtime: &R,
    http: &HttpClient,
    url: &str,
    dest_dir: &Path,
    file_name: &str,
) -> Result<u64> {
    let entry_path = dest_dir.join(file_name);
    let output_path = zip_path(dest_dir, file_name);

    if runtime.exists(&entry_path) {
        bail!(AlreadyExists(entry_path));
    }
    if runtime.exists(&output_path) {
        bail!(AlreadyExists(output_path));
    }

    runtime
        .create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create download directory {:?}", dest_dir))?;

    info!("Downloading {} -> {:?}", url, output_path);

    let bytes = http
        .download_file(url, || {
            runtime
                .create_file(&output_path)
                .with_context(|| format!("Failed to create output file at {:?}", output_path))
        })
        .await?;

    Ok(bytes)
}

/// Downloads every pool entry into `dest_dir` concurrently.
///
/// One task per entry, capped by `limit` permits; per-URL failures land in the
/// returned map and never cancel or block sibling downloads. The cancellation
/// token is checked at task start, so an already-cancelled batch performs no
/// network I/O. Waits for all tasks before returning.
#[tracing::instrument(skip(runtime, http, pool, cancel))]
pub async fn download_many<R: Runtime + 'static>(
    runtime: Arc<R>,
    http: HttpClient,
    dest_dir: &Path,
    pool: DownloadPool,
    limit: usize,
    cancel: CancellationToken,
) -> Result<HashMap<String, anyhow::Error>> {
    if !runtime.is_dir(dest_dir) {
        bail!("destination is not a directory: {:?}", dest_dir);
    }
    if pool.is_empty() {
        bail!("download pool is empty");
    }

    let errors: Arc<Mutex<HashMap<String, anyhow::Error>>> = Arc::new(Mutex::new(HashMap::new()));
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for (url, file_name) in pool {
        let runtime = Arc::clone(&runtime);
        let http = http.clone();
        let dest_dir = dest_dir.to_path_buf();
        let errors = Arc::clone(&errors);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();

        tasks.spawn(async move {
            // Holding the permit for the whole fetch bounds concurrency.
            let _permit = semaphore.acquire_owned().await;

            if cancel.is_cancelled() {
                let mut guard = errors.lock().unwrap();
                guard.insert(url, anyhow::Error::from(InstallError::Cancelled));
                return;
            }

            if let Err(e) = download_zip(&*runtime, &http, &url, &dest_dir, &file_name).await {
                warn!("Download of {} failed: {:#}", url, e);
                let mut guard = errors.lock().unwrap();
                guard.insert(url, e);
            }
        });
    }

    // Every task runs to completion; a failed sibling never short-circuits.
    while let Some(joined) = tasks.join_next().await {
        joined.context("download task panicked")?;
    }

    let errors = Arc::try_unwrap(errors)
        .map_err(|_| anyhow::anyhow!("download tasks still hold the error map"))?
        .into_inner()
        .unwrap();

    Ok(errors)
}
