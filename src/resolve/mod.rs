//! Dependency resolver: best-effort, depth-first installation of a package
//! tree against a package index.
//!
//! One missing or broken branch never prevents installing the rest of the
//! tree; per-dependency failures are accumulated and reported together with
//! the install counts.

use log::{debug, warn};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheStore, InstallStatus};
use crate::error::InstallError;
use crate::http::HttpClient;
use crate::package::{PackageIdent, PackageIndex, PackageVersion};
use crate::runtime::Runtime;

/// Accumulated result of one resolution tree.
#[derive(Debug, Default)]
pub struct InstallOutcome {
    /// Versions freshly downloaded and extracted.
    pub installed: usize,
    /// Versions that were already in the cache.
    pub already_present: usize,
    /// Per-dependency failures; non-fatal to siblings.
    pub errors: Vec<InstallError>,
}

impl InstallOutcome {
    /// True when every node either installed or was already cached.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Installs `root` and, depth-first, every package its dependency list
/// (transitively) names in `index`.
///
/// The walk is strictly sequential: a package is fully installed before any
/// of its dependencies begins. Each exact version is attempted at most once
/// (diamonds collapse); a dependency edge that loops back onto the active
/// path is recorded as [`InstallError::CycleDetected`] and not followed. The
/// cancellation token is checked between dependency edges.
#[tracing::instrument(skip_all, fields(root = %root.full_name))]
pub async fn install_with_dependencies<R: Runtime>(
    runtime: &R,
    http: &HttpClient,
    store: &CacheStore,
    root: &PackageVersion,
    index: &PackageIndex,
    cancel: &CancellationToken,
) -> InstallOutcome {
    let mut outcome = InstallOutcome::default();
    let mut visited = HashSet::new();
    let mut path = HashSet::new();

    walk(
        runtime,
        http,
        store,
        root,
        index,
        cancel,
        &mut visited,
        &mut path,
        &mut outcome,
    )
    .await;

    outcome
}

/// Recursive step. `visited` holds every exact version already attempted in
/// this resolution; `path` holds the active DFS chain for cycle detection.
#[allow(clippy::too_many_arguments)]
fn walk<'a, R: Runtime>(
    runtime: &'a R,
    http: &'a HttpClient,
    store: &'a CacheStore,
    pkg: &'a PackageVersion,
    index: &'a PackageIndex,
    cancel: &'a CancellationToken,
    visited: &'a mut HashSet<String>,
    path: &'a mut HashSet<String>,
    outcome: &'a mut InstallOutcome,
) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
    Box::pin(async move {
        visited.insert(pkg.full_name.clone());
        path.insert(pkg.full_name.clone());

        // Install failures on this node do not stop the dependency walk;
        // forward progress through the rest of the tree matters more.
        match store.install(runtime, http, pkg, cancel).await {
            Ok(InstallStatus::Installed) => outcome.installed += 1,
            Ok(InstallStatus::AlreadyPresent) => outcome.already_present += 1,
            Err(e) => {
                warn!("Install of {} failed: {}", pkg.full_name, e);
                outcome.errors.push(e);
            }
        }

        for dependency in &pkg.dependencies {
            if cancel.is_cancelled() {
                // One cancellation is one error, even though every level of
                // the walk observes the token.
                if !outcome
                    .errors
                    .iter()
                    .any(|e| matches!(e, InstallError::Cancelled))
                {
                    outcome.errors.push(InstallError::Cancelled);
                }
                break;
            }

            let ident = match PackageIdent::parse(dependency) {
                Ok(ident) => ident,
                Err(e) => {
                    outcome.errors.push(e);
                    continue;
                }
            };
            let dep_key = ident.version_full_name();

            if path.contains(&dep_key) {
                outcome.errors.push(InstallError::CycleDetected(dep_key));
                continue;
            }
            if visited.contains(&dep_key) {
                debug!("{} already attempted in this resolution, skipping", dep_key);
                continue;
            }

            match index.get_version(&ident.owner, &ident.name, &ident.version) {
                Some(dep_pkg) => {
                    walk(
                        runtime, http, store, dep_pkg, index, cancel, visited, path, outcome,
                    )
                    .await;
                }
                None => {
                    outcome
                        .errors
                        .push(InstallError::DependencyNotFound(dependency.clone()));
                }
            }
        }

        path.remove(&pkg.full_name);
    })
}
