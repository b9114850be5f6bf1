//! Directory link operations (symlink on Unix, junction on Windows).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn link_dir_impl(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(target, link).context("Failed to create directory symlink")?;
        }
        #[cfg(windows)]
        {
            use anyhow::bail;
            use std::os::windows::process::CommandExt;
            use std::process::Command;

            // CREATE_NO_WINDOW, so no console flashes up from a GUI context.
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;

            // Junctions, unlike symlinks, need no elevation or developer mode.
            let status = Command::new("cmd")
                .args(["/C", "mklink", "/J"])
                .arg(link)
                .arg(target)
                .creation_flags(CREATE_NO_WINDOW)
                .status()
                .context("Failed to run mklink")?;

            if !status.success() {
                bail!("mklink /J failed for link {:?} -> {:?}", link, target);
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).context("Failed to read link")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_link_impl(&self, path: &Path) -> bool {
        #[cfg(unix)]
        {
            fs::symlink_metadata(path)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false)
        }
        #[cfg(windows)]
        {
            // Junctions report as reparse points; read_link succeeds for both
            // junctions and symlinks.
            fs::read_link(path).is_ok()
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_link_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).context("Failed to remove link")?;
        }
        #[cfg(windows)]
        {
            // A directory junction is removed with remove_dir; fall back to
            // remove_file in case the link was created as a file symlink.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .context("Failed to remove link")?;
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[test]
    fn test_link_dir_and_read_back() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();
        runtime.write(&target.join("file.txt"), b"shared").unwrap();

        let link = dir.path().join("link");
        runtime.link_dir(&target, &link).unwrap();

        assert!(runtime.is_link(&link));
        assert_eq!(runtime.read_link(&link).unwrap(), target);

        // Content is reachable through the link.
        let through = runtime.read_to_string(&link.join("file.txt")).unwrap();
        assert_eq!(through, "shared");
    }

    #[test]
    fn test_remove_link_leaves_target_intact() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();

        let link = dir.path().join("link");
        runtime.link_dir(&target, &link).unwrap();

        runtime.remove_link(&link).unwrap();
        assert!(!runtime.exists(&link));
        assert!(runtime.is_dir(&target));
    }

    #[test]
    fn test_is_link_on_regular_dir() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        assert!(!runtime.is_link(dir.path()));
        assert!(!runtime.is_link(&dir.path().join("missing")));
    }
}
