//! Typed failure taxonomy for the install pipeline.
//!
//! "Already installed" is deliberately not part of this enum: a cache hit is a
//! benign outcome reported through [`crate::cache::InstallStatus`], so callers
//! never have to inspect error text to tell a no-op from a real failure.

use std::fmt;

/// A failure recorded while installing a package tree or linking a profile.
#[derive(Debug)]
pub enum InstallError {
    /// A dependency string did not split into `Owner-Name-Version`.
    BadDependencyIdent(String),
    /// A dependency did not resolve in the supplied package index.
    DependencyNotFound(String),
    /// The dependency graph loops back onto a package already being installed.
    CycleDetected(String),
    /// Network or HTTP-layer failure fetching the artifact.
    DownloadFailed { package: String, reason: String },
    /// Corrupt archive or file system failure during extraction.
    ExtractionFailed { package: String, reason: String },
    /// Creating or removing a profile link failed.
    LinkFailed(String),
    /// The operation was cancelled before completing.
    Cancelled,
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::BadDependencyIdent(raw) => {
                write!(
                    f,
                    "malformed dependency '{}': expected 'Owner-Name-Version'",
                    raw
                )
            }
            InstallError::DependencyNotFound(ident) => {
                write!(f, "dependency '{}' not found in package index", ident)
            }
            InstallError::CycleDetected(ident) => {
                write!(f, "dependency cycle detected at '{}'", ident)
            }
            InstallError::DownloadFailed { package, reason } => {
                write!(f, "failed to download '{}': {}", package, reason)
            }
            InstallError::ExtractionFailed { package, reason } => {
                write!(f, "failed to extract '{}': {}", package, reason)
            }
            InstallError::LinkFailed(msg) => {
                write!(f, "profile link operation failed: {}", msg)
            }
            InstallError::Cancelled => write!(f, "install cancelled"),
        }
    }
}

impl std::error::Error for InstallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_package_name() {
        let err = InstallError::DownloadFailed {
            package: "Owner-ModA-1.0.0".to_string(),
            reason: "connection reset".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Owner-ModA-1.0.0"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_display_dependency_not_found() {
        let err = InstallError::DependencyNotFound("Owner-LibX-2.0.0".to_string());
        assert!(err.to_string().contains("Owner-LibX-2.0.0"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_display_cycle() {
        let err = InstallError::CycleDetected("A-B-1.0.0".to_string());
        assert!(err.to_string().contains("cycle"));
    }
}
