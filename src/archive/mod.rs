//! Zip extraction for package artifacts.

use anyhow::{Context, Result};
use log::debug;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::runtime::Runtime;

/// Extracts every entry of a zip archive into `extract_to`.
///
/// Entry paths are sanitized through `enclosed_name`, so an archive cannot
/// write outside the destination directory. Unix file modes stored in the
/// archive are preserved.
#[tracing::instrument(skip(runtime))]
pub fn extract_zip<R: Runtime>(runtime: &R, archive_path: &Path, extract_to: &Path) -> Result<()> {
    debug!("Extracting zip archive to {:?}...", extract_to);

    let file = runtime
        .open(archive_path)
        .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;

    // The zip crate needs Read + Seek, but Runtime::open returns a plain
    // reader, so buffer the archive in memory.
    let mut buffer = Vec::new();
    let mut reader = file;
    reader
        .read_to_end(&mut buffer)
        .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
    let cursor = std::io::Cursor::new(buffer);

    let mut archive = ZipArchive::new(cursor).context("Failed to parse ZIP archive")?;

    runtime.create_dir_all(extract_to)?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read ZIP entry {}", i))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping entry with invalid path");
                continue;
            }
        };

        let full_path = extract_to.join(&entry_path);

        if entry.is_dir() {
            runtime.create_dir_all(&full_path)?;
        } else {
            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent)?;
            }
            let mut dest_file = runtime.create_file(&full_path)?;
            std::io::copy(&mut entry, &mut dest_file)
                .with_context(|| format!("Failed to extract file {:?}", full_path))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode()
                && let Err(e) = runtime.set_permissions(&full_path, mode)
            {
                debug!("Failed to set permissions on {:?}: {}", full_path, e);
            }
        }
    }

    debug!("Extraction complete.");
    Ok(())
}

#[cfg(test)]
pub mod test_support {
    use anyhow::Result;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    /// Writes a zip archive containing the given name -> content entries.
    pub fn create_test_archive(path: &Path, files: HashMap<&str, &str>) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files.iter() {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Returns the raw bytes of a zip archive with the given entries.
    pub fn test_archive_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}
