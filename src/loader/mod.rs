//! Mod loader registry: per-loader filesystem and launch conventions.
//!
//! The set of supported loaders is closed on purpose: an enum with
//! exhaustive matches, so adding a loader forces every convention site to be
//! updated.

mod bepinex;

use anyhow::{Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::runtime::Runtime;

pub use bepinex::{DOORSTOP_VERSION_FILE, doorstop_major_version};

/// Command-line fragments for launching the game with and without mods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchInstructions {
    pub modded_args: Vec<String>,
    pub vanilla_args: Vec<String>,
}

/// The runtime injection mechanism a game uses to load mods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModLoader {
    BepInEx,
    MelonLoader,
    Lovely,
}

impl ModLoader {
    /// The loader-specific directory, under the profile root, that mod links
    /// are created in.
    pub fn mod_link_path(&self, profile_dir: &Path) -> PathBuf {
        match self {
            ModLoader::BepInEx => profile_dir.join("BepInEx").join("plugins"),
            ModLoader::MelonLoader => profile_dir.join("Mods"),
            ModLoader::Lovely => profile_dir.join("lovely").join("mods"),
        }
    }

    /// Command-line fragments for a modded and a vanilla launch of the game.
    pub fn generate_instructions<R: Runtime>(
        &self,
        runtime: &R,
        profile_dir: &Path,
    ) -> Result<LaunchInstructions> {
        match self {
            ModLoader::BepInEx => bepinex::generate_instructions(runtime, profile_dir),
            ModLoader::MelonLoader | ModLoader::Lovely => {
                bail!("launch instructions for loader {} are not implemented", self)
            }
        }
    }

    /// Whether a package family is the loader's own bootstrap pack rather
    /// than an ordinary mod.
    pub fn is_loader_package(&self, full_name: &str) -> bool {
        match self {
            ModLoader::BepInEx => full_name.starts_with("BepInEx-BepInExPack"),
            ModLoader::MelonLoader => full_name == "LavaGang-MelonLoader",
            ModLoader::Lovely => full_name == "Thunderstore-lovely",
        }
    }
}

impl fmt::Display for ModLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModLoader::BepInEx => write!(f, "bepinex"),
            ModLoader::MelonLoader => write!(f, "melonloader"),
            ModLoader::Lovely => write!(f, "lovely"),
        }
    }
}

impl FromStr for ModLoader {
    type Err = anyhow::Error;

    /// Parses the ecosystem's loader tags, including the `recursive-`
    /// MelonLoader variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bepinex" => Ok(ModLoader::BepInEx),
            "melonloader" | "recursive-melonloader" => Ok(ModLoader::MelonLoader),
            "lovely" => Ok(ModLoader::Lovely),
            _ => bail!(
                "Unknown mod loader: {}. Expected bepinex, melonloader, or lovely.",
                s
            ),
        }
    }
}
