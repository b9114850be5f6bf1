use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::runtime::Runtime;

/// File name of the manifest inside each profile directory.
pub const MANIFEST_NAME: &str = "profile.json";

/// The serialized state of one profile: which exact package versions are
/// linked into it. The links themselves remain the operational truth; the
/// manifest exists so a profile can be listed and rebuilt without walking
/// the loader directories.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileManifest {
    /// `Owner-Name-Version` identifiers, in link order.
    #[serde(default)]
    pub mods: Vec<String>,
}

impl ProfileManifest {
    /// Loads the manifest from a profile directory.
    pub fn load<R: Runtime>(runtime: &R, profile_dir: &Path) -> Result<Self> {
        let raw = runtime.read_to_string(&profile_dir.join(MANIFEST_NAME))?;
        serde_json::from_str(&raw).context("Failed to parse profile manifest")
    }

    /// Writes the manifest into a profile directory, creating it if needed.
    pub fn save<R: Runtime>(&self, runtime: &R, profile_dir: &Path) -> Result<()> {
        runtime.create_dir_all(profile_dir)?;
        let data = serde_json::to_vec_pretty(self).context("Failed to serialize manifest")?;
        runtime.write(&profile_dir.join(MANIFEST_NAME), &data)
    }

    /// Records a linked mod. No-op if already present.
    pub fn add_mod(&mut self, version_full_name: &str) {
        if !self.mods.iter().any(|m| m == version_full_name) {
            self.mods.push(version_full_name.to_string());
        }
    }

    /// Removes a mod from the record.
    pub fn remove_mod(&mut self, version_full_name: &str) {
        self.mods.retain(|m| m != version_full_name);
    }
}

/// Creates an empty profile: its directory plus a blank manifest. No-op for
/// a profile that already has a manifest.
pub fn create_profile<R: Runtime>(runtime: &R, profiles_dir: &Path, name: &str) -> Result<()> {
    let profile_dir = profiles_dir.join(name);
    if runtime.exists(&profile_dir.join(MANIFEST_NAME)) {
        return Ok(());
    }
    ProfileManifest::default().save(runtime, &profile_dir)
}

/// Lists the profile names under a game's `Profiles` directory: every child
/// directory that contains a manifest.
pub fn profile_names<R: Runtime>(runtime: &R, profiles_dir: &Path) -> Result<Vec<String>> {
    if !runtime.exists(profiles_dir) {
        // The user simply has not created any profiles yet.
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in runtime.read_dir(profiles_dir)? {
        if runtime.is_dir(&entry)
            && runtime.exists(&entry.join(MANIFEST_NAME))
            && let Some(name) = entry.file_name()
        {
            names.push(name.to_string_lossy().to_string());
        }
    }
    names.sort();

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let profile = dir.path().join("Default");

        let mut manifest = ProfileManifest::default();
        manifest.add_mod("Owner-ModA-1.0.0");
        manifest.add_mod("Owner-ModA-1.0.0"); // duplicate is a no-op
        manifest.add_mod("Owner-LibX-2.0.0");
        manifest.save(&RealRuntime, &profile).unwrap();

        let loaded = ProfileManifest::load(&RealRuntime, &profile).unwrap();
        assert_eq!(loaded.mods, vec!["Owner-ModA-1.0.0", "Owner-LibX-2.0.0"]);
    }

    #[test]
    fn test_remove_mod() {
        let mut manifest = ProfileManifest::default();
        manifest.add_mod("Owner-ModA-1.0.0");
        manifest.remove_mod("Owner-ModA-1.0.0");
        assert!(manifest.mods.is_empty());
    }

    #[test]
    fn test_profile_names_skips_dirs_without_manifest() {
        let dir = tempdir().unwrap();

        ProfileManifest::default()
            .save(&RealRuntime, &dir.path().join("Default"))
            .unwrap();
        ProfileManifest::default()
            .save(&RealRuntime, &dir.path().join("Test"))
            .unwrap();
        std::fs::create_dir(dir.path().join("not-a-profile")).unwrap();

        let names = profile_names(&RealRuntime, dir.path()).unwrap();
        assert_eq!(names, vec!["Default", "Test"]);
    }

    #[test]
    fn test_create_profile_is_idempotent() {
        let dir = tempdir().unwrap();

        create_profile(&RealRuntime, dir.path(), "Default").unwrap();

        // An existing manifest is not clobbered.
        let profile_dir = dir.path().join("Default");
        let mut manifest = ProfileManifest::load(&RealRuntime, &profile_dir).unwrap();
        manifest.add_mod("Owner-ModA-1.0.0");
        manifest.save(&RealRuntime, &profile_dir).unwrap();

        create_profile(&RealRuntime, dir.path(), "Default").unwrap();
        let reloaded = ProfileManifest::load(&RealRuntime, &profile_dir).unwrap();
        assert_eq!(reloaded.mods, vec!["Owner-ModA-1.0.0"]);
    }

    #[test]
    fn test_profile_names_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let names = profile_names(&RealRuntime, &dir.path().join("nope")).unwrap();
        assert!(names.is_empty());
    }
}
