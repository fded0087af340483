//! File operations for the artifact library

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy a file into `dest_dir` under `filename`, creating the directory if needed
pub fn copy_file_to_directory(source: &Path, dest_dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Could not create directory: {:?}", dest_dir))?;

    let dest_path = dest_dir.join(filename);

    fs::copy(source, &dest_path)
        .with_context(|| format!("Could not copy {:?} to {:?}", source, dest_path))?;

    Ok(dest_path)
}

/// Move a file to a new location
pub fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    // Rename only works on the same file system
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    fs::copy(source, dest)
        .with_context(|| format!("Could not copy {:?} to {:?}", source, dest))?;
    fs::remove_file(source)
        .with_context(|| format!("Could not remove {:?} after copying", source))?;

    Ok(())
}

/// Pick a file name in `dir` that does not exist yet: `name.ext`, `name_1.ext`, `name_2.ext`, ...
pub fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let extension = Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, extension);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Make sure a directory exists (idempotent)
pub fn ensure_directory(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}
