use std::fmt;
use std::str::FromStr;

use crate::error::InstallError;

/// An exact package version identifier, `Owner-Name-Version` on the wire.
///
/// `Owner-Name` (without the version) identifies a package family; the full
/// three-part form identifies one version of it. Owner and name must not
/// themselves contain `-`; a string that does not split into exactly three
/// non-empty parts is rejected rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdent {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl PackageIdent {
    /// Parses a dependency string of the form `Owner-Name-Version`.
    pub fn parse(raw: &str) -> Result<Self, InstallError> {
        let parts: Vec<&str> = raw.split('-').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(InstallError::BadDependencyIdent(raw.to_string()));
        }

        Ok(PackageIdent {
            owner: parts[0].to_string(),
            name: parts[1].to_string(),
            version: parts[2].to_string(),
        })
    }

    /// The package family identifier, `Owner-Name`.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.owner, self.name)
    }

    /// The exact version identifier, `Owner-Name-Version`.
    pub fn version_full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PackageIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.owner, self.name, self.version)
    }
}

impl FromStr for PackageIdent {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageIdent::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let ident = PackageIdent::parse("Owner-ModA-1.0.0").unwrap();
        assert_eq!(ident.owner, "Owner");
        assert_eq!(ident.name, "ModA");
        assert_eq!(ident.version, "1.0.0");
    }

    #[test]
    fn test_round_trip() {
        // Splitting on '-' and re-joining must reproduce the original string.
        for raw in ["Owner-ModA-1.0.0", "Owen3H-IntroTweaks-1.5.0", "a-b-c"] {
            let ident = PackageIdent::parse(raw).unwrap();
            assert_eq!(ident.to_string(), raw);
        }
    }

    #[test]
    fn test_full_name_drops_version() {
        let ident = PackageIdent::parse("Owner-ModA-1.0.0").unwrap();
        assert_eq!(ident.full_name(), "Owner-ModA");
        assert_eq!(ident.version_full_name(), "Owner-ModA-1.0.0");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(PackageIdent::parse("Owner-ModA").is_err());
        assert!(PackageIdent::parse("Owner-ModA-1.0.0-extra").is_err());
        assert!(PackageIdent::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(PackageIdent::parse("Owner--1.0.0").is_err());
        assert!(PackageIdent::parse("-ModA-1.0.0").is_err());
        assert!(PackageIdent::parse("Owner-ModA-").is_err());
    }

    #[test]
    fn test_from_str() {
        let ident: PackageIdent = "Owner-ModA-1.0.0".parse().unwrap();
        assert_eq!(ident.name, "ModA");
    }
}
