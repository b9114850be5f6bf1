//! Filesystem layout under the user's config directory.
//!
//! ```text
//! <UserConfigDir>/modvault/
//!   Games/<GameTitle>/
//!     ModCache/<Owner-Name-Version>/...
//!     Profiles/<ProfileName>/<LoaderModPath>/<Owner-Name-Version> -> ModCache entry
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

pub const APP_DIR_NAME: &str = "modvault";

/// The application's root config directory.
pub fn app_config_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let base = runtime
        .config_dir()
        .context("Could not determine user config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Root directory for one game's cache and profiles.
pub fn game_dir<R: Runtime>(runtime: &R, game_title: &str) -> Result<PathBuf> {
    Ok(app_config_dir(runtime)?.join("Games").join(game_title))
}

/// The shared mod cache for one game.
pub fn mod_cache_dir<R: Runtime>(runtime: &R, game_title: &str) -> Result<PathBuf> {
    Ok(game_dir(runtime, game_title)?.join("ModCache"))
}

/// Directory containing all of a game's profiles.
pub fn profiles_dir<R: Runtime>(runtime: &R, game_title: &str) -> Result<PathBuf> {
    Ok(game_dir(runtime, game_title)?.join("Profiles"))
}

/// Root directory of one named profile.
pub fn profile_dir<R: Runtime>(runtime: &R, game_title: &str, profile_name: &str) -> Result<PathBuf> {
    Ok(profiles_dir(runtime, game_title)?.join(profile_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_mock_runtime_basics, test_config_dir};

    #[test]
    fn test_layout() {
        let mut runtime = MockRuntime::new();
        configure_mock_runtime_basics(&mut runtime);

        let root = test_config_dir().join("modvault");

        assert_eq!(app_config_dir(&runtime).unwrap(), root);
        assert_eq!(
            mod_cache_dir(&runtime, "Lethal Company").unwrap(),
            root.join("Games").join("Lethal Company").join("ModCache")
        );
        assert_eq!(
            profile_dir(&runtime, "Lethal Company", "Default").unwrap(),
            root.join("Games")
                .join("Lethal Company")
                .join("Profiles")
                .join("Default")
        );
    }

    #[test]
    fn test_missing_config_dir_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_config_dir().returning(|| None);
        assert!(app_config_dir(&runtime).is_err());
    }
}
