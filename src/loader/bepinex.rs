//! BepInEx launch conventions: Unity Doorstop probing and preloader lookup.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::LaunchInstructions;

/// Marker file Unity Doorstop v4+ drops next to the game executable.
pub const DOORSTOP_VERSION_FILE: &str = ".doorstop_version";

/// Doorstop major version assumed when the probe file is missing or
/// malformed. v3 predates the marker file entirely.
const DEFAULT_DOORSTOP_MAJOR: u64 = 3;

/// Preloader assembly names shipped by the known BepInEx builds. Mono and
/// IL2CPP builds use different names, so all are probed.
const KNOWN_PRELOADERS: &[&str] = &[
    "BepInEx.Preloader.dll",
    "BepInEx.Unity.Mono.Preloader.dll",
    "BepInEx.Unity.IL2CPP.dll",
    "BepInEx.IL2CPP.dll",
];

/// Reads the Doorstop major version for a profile or game directory.
///
/// Scans `.doorstop_version` for the first non-blank line that parses as a
/// three-part numeric version. Missing file, malformed content, or a major
/// of 3 or lower all fall back to 3.
#[tracing::instrument(skip(runtime))]
pub fn doorstop_major_version<R: Runtime>(runtime: &R, dir: &Path) -> u64 {
    let probe_path = dir.join(DOORSTOP_VERSION_FILE);

    let contents = match runtime.read_to_string(&probe_path) {
        Ok(contents) => contents,
        Err(_) => {
            debug!("No {} in {:?}, assuming v3", DOORSTOP_VERSION_FILE, dir);
            return DEFAULT_DOORSTOP_MAJOR;
        }
    };

    match first_semver_line(&contents).and_then(|line| major_of(&line)) {
        Some(major) if major > DEFAULT_DOORSTOP_MAJOR => major,
        _ => DEFAULT_DOORSTOP_MAJOR,
    }
}

/// Finds the first non-blank line that parses as `MAJOR.MINOR.PATCH` with all
/// numeric parts.
fn first_semver_line(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            let parts: Vec<&str> = line.split('.').collect();
            parts.len() == 3 && parts.iter().all(|p| p.parse::<u64>().is_ok())
        })
        .map(str::to_string)
}

fn major_of(version: &str) -> Option<u64> {
    version.split('.').next()?.parse().ok()
}

/// Locates the preloader assembly under `BepInEx/core/`, matching against the
/// known Mono and IL2CPP names. Falls back to the classic Mono path when
/// nothing is found so instruction generation still produces usable args for
/// a profile that has not been set up yet.
fn find_preloader<R: Runtime>(runtime: &R, profile_dir: &Path) -> PathBuf {
    let core_dir = profile_dir.join("BepInEx").join("core");

    if let Ok(entries) = runtime.read_dir(&core_dir) {
        for known in KNOWN_PRELOADERS {
            if let Some(found) = entries
                .iter()
                .find(|e| e.file_name().is_some_and(|n| n == *known))
            {
                return found.clone();
            }
        }
    }

    core_dir.join(KNOWN_PRELOADERS[0])
}

/// Builds the Doorstop argument fragments for a modded and a vanilla launch.
/// Doorstop v4 renamed both flags, so the probe decides the syntax.
pub fn generate_instructions<R: Runtime>(
    runtime: &R,
    profile_dir: &Path,
) -> Result<LaunchInstructions> {
    let major = doorstop_major_version(runtime, profile_dir);
    let preloader = find_preloader(runtime, profile_dir);
    let preloader = preloader.to_string_lossy().to_string();

    let instructions = if major >= 4 {
        LaunchInstructions {
            modded_args: vec![
                "--doorstop-enabled".to_string(),
                "true".to_string(),
                "--doorstop-target-assembly".to_string(),
                preloader,
            ],
            vanilla_args: vec!["--doorstop-enabled".to_string(), "false".to_string()],
        }
    } else {
        LaunchInstructions {
            modded_args: vec![
                "--doorstop-enable".to_string(),
                "true".to_string(),
                "--doorstop-target".to_string(),
                preloader,
            ],
            vanilla_args: vec!["--doorstop-enable".to_string(), "false".to_string()],
        }
    };

    Ok(instructions)
}
