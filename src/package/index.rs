use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One version of a package, as served by the community registry's v1 API.
/// Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageVersion {
    /// Exact version identifier, `Owner-Name-Version`.
    pub full_name: String,
    pub version_number: String,
    pub download_url: String,
    /// Exact-version identifiers of required packages, `Owner-Name-Version` each.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_size: u64,
}

/// A package family with all of its published versions.
///
/// Versions are ordered newest-first by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Package {
    pub name: String,
    /// Family identifier, `Owner-Name`.
    pub full_name: String,
    pub owner: String,
    #[serde(default)]
    pub is_deprecated: bool,
    pub versions: Vec<PackageVersion>,
}

impl Package {
    /// The most recently published version, if any.
    pub fn latest_version(&self) -> Option<&PackageVersion> {
        self.versions.first()
    }

    /// Looks up one exact version by its version number.
    pub fn get_version(&self, version: &str) -> Option<&PackageVersion> {
        self.versions.iter().find(|v| v.version_number == version)
    }
}

/// In-memory package index for one community, queried by family or by exact
/// version. The pipeline only reads it.
#[derive(Debug, Default)]
pub struct PackageIndex {
    families: HashMap<String, Package>,
}

impl PackageIndex {
    pub fn new(packages: Vec<Package>) -> Self {
        let families = packages
            .into_iter()
            .map(|pkg| (pkg.full_name.clone(), pkg))
            .collect();

        Self { families }
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Looks up a package family by owner and name.
    pub fn get(&self, owner: &str, name: &str) -> Option<&Package> {
        self.families.get(&format!("{}-{}", owner, name))
    }

    /// Looks up a package family by its `Owner-Name` identifier.
    pub fn get_by_full_name(&self, full_name: &str) -> Option<&Package> {
        self.families.get(full_name)
    }

    /// Looks up one exact package version.
    pub fn get_version(&self, owner: &str, name: &str, version: &str) -> Option<&PackageVersion> {
        self.get(owner, name).and_then(|pkg| pkg.get_version(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn version(full_name: &str, number: &str, deps: &[&str]) -> PackageVersion {
        PackageVersion {
            full_name: format!("{}-{}", full_name, number),
            version_number: number.to_string(),
            download_url: format!("https://example.invalid/{}/{}.zip", full_name, number),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    fn package(owner: &str, name: &str, versions: Vec<PackageVersion>) -> Package {
        Package {
            name: name.to_string(),
            full_name: format!("{}-{}", owner, name),
            owner: owner.to_string(),
            is_deprecated: false,
            versions,
        }
    }

    #[test]
    fn test_index_lookup_by_family_and_version() {
        let index = PackageIndex::new(vec![package(
            "Owner",
            "ModA",
            vec![
                version("Owner-ModA", "2.0.0", &[]),
                version("Owner-ModA", "1.0.0", &[]),
            ],
        )]);

        assert_eq!(index.len(), 1);

        let pkg = index.get("Owner", "ModA").unwrap();
        assert_eq!(pkg.latest_version().unwrap().version_number, "2.0.0");

        let v1 = index.get_version("Owner", "ModA", "1.0.0").unwrap();
        assert_eq!(v1.full_name, "Owner-ModA-1.0.0");

        assert!(index.get_version("Owner", "ModA", "9.9.9").is_none());
        assert!(index.get("Nobody", "Nothing").is_none());
    }

    #[test]
    fn test_wire_schema_deserializes() {
        // Shape of one entry from the registry's package list endpoint.
        let json = r#"{
            "name": "IntroTweaks",
            "full_name": "Owen3H-IntroTweaks",
            "owner": "Owen3H",
            "is_deprecated": false,
            "versions": [{
                "full_name": "Owen3H-IntroTweaks-1.5.0",
                "version_number": "1.5.0",
                "download_url": "https://example.invalid/IntroTweaks/1.5.0.zip",
                "dependencies": ["BepInEx-BepInExPack-5.4.2100"]
            }]
        }"#;

        let pkg: Package = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.full_name, "Owen3H-IntroTweaks");
        assert_eq!(pkg.versions[0].dependencies.len(), 1);
        assert_eq!(pkg.versions[0].file_size, 0); // absent field defaults
    }
}
