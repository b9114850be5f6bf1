//! Profiles: named per-game mod configurations.
//!
//! A profile is a directory under `Games/<Title>/Profiles/<Name>` holding a
//! small JSON manifest and a loader-specific mod directory whose entries are
//! links into the shared ModCache.

mod linker;
mod manifest;

pub use linker::ProfileLinker;
pub use manifest::{MANIFEST_NAME, ProfileManifest, create_profile, profile_names};
