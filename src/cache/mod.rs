//! Content-addressable cache of extracted package payloads.
//!
//! One directory per exact package version, named `Owner-Name-Version`.
//! Existence of the directory is the sole truth of "installed"; there is no
//! separate manifest. Entries are created here, never mutated afterwards.

use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::archive::extract_zip;
use crate::download::{self, AlreadyExists};
use crate::error::InstallError;
use crate::http::HttpClient;
use crate::package::PackageVersion;
use crate::runtime::Runtime;

/// Name of the scratch directory extractions are staged under.
const STAGING_DIR_NAME: &str = ".staging";

/// How a cache install concluded, when it did not fail.
///
/// A cache hit is a distinct success, not an error, so callers can tell a
/// no-op from a real failure without inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// The payload was downloaded, extracted and moved into place.
    Installed,
    /// The entry already existed; no network I/O was performed.
    AlreadyPresent,
}

/// The shared mod cache for one game.
///
/// The root is an explicit constructor argument; nothing here reads
/// process-global state, so two games' caches can be driven concurrently.
pub struct CacheStore {
    root: PathBuf,
    // Serializes concurrent installs of the same exact version so only one
    // task downloads and the rest observe the finished entry.
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cache entry for an exact version, `<root>/<Owner-Name-Version>`.
    pub fn entry_path(&self, version_full_name: &str) -> PathBuf {
        self.root.join(version_full_name)
    }

    /// Whether an exact version is installed, by the on-disk truth.
    pub fn is_installed<R: Runtime>(&self, runtime: &R, version_full_name: &str) -> bool {
        runtime.is_dir(&self.entry_path(version_full_name))
    }

    /// Installs one package version into the cache.
    ///
    /// Cache hit short-circuits with [`InstallStatus::AlreadyPresent`] before
    /// any network I/O. Otherwise the zip is downloaded next to the entry,
    /// extracted into a staging directory, and the staging directory is
    /// renamed into the final path only once extraction fully succeeded, so an
    /// entry's presence always implies a complete payload. Partial state is
    /// deleted on every failure path.
    #[tracing::instrument(skip(self, runtime, http, pkg, cancel), fields(pkg = %pkg.full_name))]
    pub async fn install<R: Runtime>(
        &self,
        runtime: &R,
        http: &HttpClient,
        pkg: &PackageVersion,
        cancel: &CancellationToken,
    ) -> Result<InstallStatus, InstallError> {
        let key = pkg.full_name.clone();
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }

        let entry = self.entry_path(&key);
        if runtime.exists(&entry) {
            debug!("{} already installed, skipping download", key);
            return Ok(InstallStatus::AlreadyPresent);
        }

        runtime
            .create_dir_all(&self.root)
            .map_err(|e| InstallError::DownloadFailed {
                package: key.clone(),
                reason: format!("{:#}", e),
            })?;

        let zip_path = download::zip_path(&self.root, &key);
        match download::download_zip(runtime, http, &pkg.download_url, &self.root, &key).await {
            Ok(bytes) => debug!("Fetched {} ({} bytes)", key, bytes),
            Err(e) => {
                // Lost a race against an install that finished in between the
                // existence check and the fetch.
                if e.downcast_ref::<AlreadyExists>().is_some() && runtime.exists(&entry) {
                    return Ok(InstallStatus::AlreadyPresent);
                }
                // A half-written zip from a dead connection must not wedge the
                // next install of this version.
                if runtime.exists(&zip_path) {
                    let _ = runtime.remove_file(&zip_path);
                }
                return Err(InstallError::DownloadFailed {
                    package: key,
                    reason: format!("{:#}", e),
                });
            }
        }

        match self.extract_staged(runtime, &zip_path, &entry, &key) {
            Ok(()) => {
                info!("Installed {} into {:?}", key, self.root);
                Ok(InstallStatus::Installed)
            }
            Err(e) => {
                // No partial entries: whatever half-finished state exists is
                // removed before the error is surfaced.
                let _ = runtime.remove_file(&zip_path);
                Err(e)
            }
        }
    }

    /// Extracts the downloaded zip into a staging directory, then atomically
    /// renames it into the final entry path and deletes the zip.
    fn extract_staged<R: Runtime>(
        &self,
        runtime: &R,
        zip_path: &Path,
        entry: &Path,
        key: &str,
    ) -> Result<(), InstallError> {
        let staging = self.root.join(STAGING_DIR_NAME).join(key);
        if runtime.exists(&staging) {
            runtime
                .remove_dir_all(&staging)
                .map_err(|e| extraction_failed(key, &e))?;
        }

        if let Err(e) = extract_zip(runtime, zip_path, &staging) {
            let _ = runtime.remove_dir_all(&staging);
            return Err(extraction_failed(key, &e));
        }

        runtime
            .remove_file(zip_path)
            .map_err(|e| extraction_failed(key, &e))?;

        if let Err(e) = runtime.rename(&staging, entry) {
            let _ = runtime.remove_dir_all(&staging);
            // A concurrent install may have won the rename.
            if runtime.exists(entry) {
                return Ok(());
            }
            return Err(extraction_failed(key, &e));
        }

        Ok(())
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.in_flight.lock().unwrap();
        map.entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

fn extraction_failed(key: &str, e: &anyhow::Error) -> InstallError {
    InstallError::ExtractionFailed {
        package: key.to_string(),
        reason: format!("{:#}", e),
    }
}
