//! Environment and well-known directory lookup.

use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn config_dir_impl(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_config_dir() {
        let runtime = RealRuntime;

        // Should resolve on all supported desktop platforms.
        let dir = runtime.config_dir();
        assert!(dir.is_some() || cfg!(target_os = "linux")); // CI might run without XDG dirs
    }
}
