use log::{debug, info};
use std::path::PathBuf;

use crate::error::InstallError;
use crate::loader::ModLoader;
use crate::runtime::Runtime;

/// Mirrors cached mods into profiles via directory links.
///
/// Mods only ever exist once, in the game's ModCache; a profile's mod
/// directory holds links into it. That keeps a single source of truth on
/// disk and lets any number of profiles reference one download. A cache
/// entry keeps no back-reference to its links: removing the last link
/// orphans (but never deletes) the entry.
pub struct ProfileLinker {
    game_dir: PathBuf,
}

impl ProfileLinker {
    /// A linker rooted at one game's directory (the parent of `ModCache`
    /// and `Profiles`).
    pub fn new(game_dir: PathBuf) -> Self {
        Self { game_dir }
    }

    pub fn mod_cache_dir(&self) -> PathBuf {
        self.game_dir.join("ModCache")
    }

    pub fn profile_dir(&self, profile_name: &str) -> PathBuf {
        self.game_dir.join("Profiles").join(profile_name)
    }

    /// Path a given mod is linked at inside a profile.
    pub fn link_path(&self, loader: ModLoader, profile_name: &str, full_name: &str) -> PathBuf {
        loader
            .mod_link_path(&self.profile_dir(profile_name))
            .join(full_name)
    }

    /// Creates a directory link for a cached mod inside a profile's loader
    /// mod directory.
    ///
    /// The cache entry must already exist (link only after a successful
    /// install), and the destination must be free.
    #[tracing::instrument(skip(self, runtime))]
    pub fn link_mod_to_profile<R: Runtime>(
        &self,
        runtime: &R,
        loader: ModLoader,
        profile_name: &str,
        full_name: &str,
    ) -> Result<(), InstallError> {
        let source = self.mod_cache_dir().join(full_name);
        if !runtime.is_dir(&source) {
            return Err(InstallError::LinkFailed(format!(
                "'{}' is not installed in the mod cache",
                full_name
            )));
        }

        let link_dir = loader.mod_link_path(&self.profile_dir(profile_name));
        runtime
            .create_dir_all(&link_dir)
            .map_err(|e| InstallError::LinkFailed(format!("{:#}", e)))?;

        let link = link_dir.join(full_name);
        if runtime.exists(&link) || runtime.is_link(&link) {
            let what = if runtime.is_link(&link) {
                "already linked"
            } else {
                "name collision with an existing file or directory"
            };
            return Err(InstallError::LinkFailed(format!("{:?}: {}", link, what)));
        }

        runtime
            .link_dir(&source, &link)
            .map_err(|e| InstallError::LinkFailed(format!("{:#}", e)))?;

        info!("Linked {} into profile '{}'", full_name, profile_name);
        Ok(())
    }

    /// Removes a profile's link to a mod, leaving the cache entry and every
    /// other profile's links untouched.
    ///
    /// Refuses to remove anything that is not a link pointing into this
    /// game's ModCache, so a real directory that happens to share the name
    /// is never deleted.
    #[tracing::instrument(skip(self, runtime))]
    pub fn unlink_mod_from_profile<R: Runtime>(
        &self,
        runtime: &R,
        loader: ModLoader,
        profile_name: &str,
        full_name: &str,
    ) -> Result<(), InstallError> {
        let link = self.link_path(loader, profile_name, full_name);

        if !runtime.is_link(&link) {
            let what = if runtime.exists(&link) {
                "exists but is not a link"
            } else {
                "is not linked"
            };
            return Err(InstallError::LinkFailed(format!("{:?} {}", link, what)));
        }

        let target = runtime
            .read_link(&link)
            .map_err(|e| InstallError::LinkFailed(format!("{:#}", e)))?;
        if !target.starts_with(self.mod_cache_dir()) {
            return Err(InstallError::LinkFailed(format!(
                "{:?} points outside the mod cache ({:?}), refusing to remove",
                link, target
            )));
        }

        runtime
            .remove_link(&link)
            .map_err(|e| InstallError::LinkFailed(format!("{:#}", e)))?;

        debug!("Unlinked {} from profile '{}'", full_name, profile_name);
        Ok(())
    }
}
