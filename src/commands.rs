//! Top-level command orchestration: glue between the CLI surface and the
//! install pipeline.

use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheStore;
use crate::http::HttpClient;
use crate::loader::ModLoader;
use crate::package::{PackageIdent, RemoteIndexSource};
use crate::paths;
use crate::profile::{ProfileLinker, ProfileManifest};
use crate::resolve::install_with_dependencies;
use crate::runtime::Runtime;

/// Resolves the directory a game's cache and profiles live under, either
/// below an explicit root or below the user's config directory.
fn resolve_game_dir<R: Runtime>(
    runtime: &R,
    root: Option<PathBuf>,
    game_title: &str,
) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root.join("Games").join(game_title)),
        None => paths::game_dir(runtime, game_title),
    }
}

/// Installs a package and its transitive dependencies into a game's cache.
///
/// Fetches the community's package index, resolves the requested version in
/// it and walks the dependency tree. Per-dependency failures are reported but
/// do not abort the walk; the command fails afterwards if any occurred.
/// Ctrl-C cancels between dependency edges.
pub async fn install<R: Runtime>(
    runtime: &R,
    ident: &str,
    game_title: &str,
    community: &str,
    root: Option<PathBuf>,
    index_url: Option<String>,
) -> Result<()> {
    let ident: PackageIdent = ident.parse()?;

    let game_dir = resolve_game_dir(runtime, root, game_title)?;
    let store = CacheStore::new(game_dir.join("ModCache"));
    let http = HttpClient::build()?;

    let source = RemoteIndexSource::new(http.clone(), index_url);
    let index = source.fetch_index(community).await?;

    let pkg = index
        .get_version(&ident.owner, &ident.name, &ident.version)
        .with_context(|| {
            format!(
                "Package {} not found in the '{}' index",
                ident.version_full_name(),
                community
            )
        })?;

    let cancel = CancellationToken::new();
    let signal_guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current package");
            signal_guard.cancel();
        }
    });

    let outcome = install_with_dependencies(runtime, &http, &store, pkg, &index, &cancel).await;

    info!(
        "Installed {} package(s), {} already present",
        outcome.installed, outcome.already_present
    );
    println!(
        "{}: {} installed, {} already present",
        ident.version_full_name(),
        outcome.installed,
        outcome.already_present
    );

    if !outcome.is_clean() {
        for error in &outcome.errors {
            eprintln!("error: {}", error);
        }
        bail!("{} package(s) failed to install", outcome.errors.len());
    }
    Ok(())
}

/// Links an installed package into a profile and records it in the profile
/// manifest.
pub fn link<R: Runtime>(
    runtime: &R,
    ident: &str,
    game_title: &str,
    profile_name: &str,
    loader: ModLoader,
    root: Option<PathBuf>,
) -> Result<()> {
    let ident: PackageIdent = ident.parse()?;
    let full_name = ident.version_full_name();

    let game_dir = resolve_game_dir(runtime, root, game_title)?;
    let linker = ProfileLinker::new(game_dir);

    linker.link_mod_to_profile(runtime, loader, profile_name, &full_name)?;

    let profile_dir = linker.profile_dir(profile_name);
    let mut manifest = ProfileManifest::load(runtime, &profile_dir).unwrap_or_default();
    manifest.add_mod(&full_name);
    manifest.save(runtime, &profile_dir)?;

    println!("Linked {} into profile '{}'", full_name, profile_name);
    Ok(())
}

/// Removes a package's link from a profile and updates the manifest. The
/// cached payload stays on disk.
pub fn unlink<R: Runtime>(
    runtime: &R,
    ident: &str,
    game_title: &str,
    profile_name: &str,
    loader: ModLoader,
    root: Option<PathBuf>,
) -> Result<()> {
    let ident: PackageIdent = ident.parse()?;
    let full_name = ident.version_full_name();

    let game_dir = resolve_game_dir(runtime, root, game_title)?;
    let linker = ProfileLinker::new(game_dir);

    linker.unlink_mod_from_profile(runtime, loader, profile_name, &full_name)?;

    let profile_dir = linker.profile_dir(profile_name);
    if let Ok(mut manifest) = ProfileManifest::load(runtime, &profile_dir) {
        manifest.remove_mod(&full_name);
        manifest.save(runtime, &profile_dir)?;
    }

    println!("Unlinked {} from profile '{}'", full_name, profile_name);
    Ok(())
}

/// Prints the loader's launch arguments for a profile, one per line.
pub fn launch_args<R: Runtime>(
    runtime: &R,
    game_title: &str,
    profile_name: &str,
    loader: ModLoader,
    vanilla: bool,
    root: Option<PathBuf>,
) -> Result<()> {
    let game_dir = resolve_game_dir(runtime, root, game_title)?;
    let profile_dir = game_dir.join("Profiles").join(profile_name);

    let instructions = loader.generate_instructions(runtime, &profile_dir)?;
    let args = if vanilla {
        instructions.vanilla_args
    } else {
        instructions.modded_args
    };

    println!("{}", args.join(" "));
    Ok(())
}
