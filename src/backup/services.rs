//! Full-application backup and restore.
//!
//! A backup is a single zip holding the persisted store under a fixed entry
//! name plus the entire uploads tree. Restore replaces both in place, keeping
//! a rollback copy of the previous store next to it. The two replacement steps
//! are not atomic with respect to each other; a crash between them leaves the
//! rollback copy for manual recovery.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use walkdir::WalkDir;
use zip::{write::FileOptions, ZipArchive, ZipWriter};

use crate::error::ApiError;

/// Entry name of the store inside the archive, and the on-disk file name.
pub const STORE_FILE_NAME: &str = "garagekeep.db";
/// Archive subtree holding uploaded files.
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Build a backup archive in memory. Concurrent writers may still be touching
/// the store; the snapshot is best effort, same as copying the file would be.
pub fn create_backup_archive(store_path: &Path, uploads_dir: &Path) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let store = fs::read(store_path)
        .with_context(|| format!("reading store at {}", store_path.display()))?;
    writer.start_file(STORE_FILE_NAME, options)?;
    writer.write_all(&store)?;

    if uploads_dir.is_dir() {
        for entry in WalkDir::new(uploads_dir).follow_links(false) {
            let entry = entry.context("walking uploads tree")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(uploads_dir)
                .context("upload path outside uploads root")?;
            let name = format!("{}/{}", UPLOADS_DIR_NAME, relative.to_string_lossy());
            writer.start_file(name, options)?;
            writer.write_all(&fs::read(entry.path())?)?;
        }
    }

    let archive = writer.finish()?.into_inner();
    info!(bytes = archive.len(), "backup archive created");
    Ok(archive)
}

/// Replace the live store and uploads tree with the contents of `archive`.
///
/// The previous store survives at `<store>.backup` so a bad restore can be
/// rolled back by hand.
pub fn restore_backup_archive(
    archive: &[u8],
    store_path: &Path,
    uploads_dir: &Path,
) -> Result<(), ApiError> {
    let mut zip =
        ZipArchive::new(Cursor::new(archive)).map_err(|_| ApiError::InvalidArchive)?;

    let scratch = tempfile::tempdir().map_err(|e| ApiError::Storage(e.into()))?;
    zip.extract(scratch.path())
        .map_err(|_| ApiError::InvalidArchive)?;

    let extracted_store = scratch.path().join(STORE_FILE_NAME);
    if !extracted_store.is_file() {
        return Err(ApiError::MissingStore);
    }

    if store_path.is_file() {
        let rollback = store_path.with_extension("db.backup");
        fs::copy(store_path, &rollback).map_err(|e| ApiError::Storage(e.into()))?;
        info!(path = %rollback.display(), "previous store kept as rollback copy");
    }

    if let Some(parent) = store_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ApiError::Storage(e.into()))?;
    }
    fs::copy(&extracted_store, store_path).map_err(|e| ApiError::Storage(e.into()))?;
    set_file_permissions(store_path)?;

    let extracted_uploads = scratch.path().join(UPLOADS_DIR_NAME);
    replace_uploads_tree(&extracted_uploads, uploads_dir)?;

    info!("backup restored");
    Ok(())
}

/// Wipe the live uploads tree and repopulate it from `source` (which may be
/// absent when the backup held no uploads).
fn replace_uploads_tree(source: &Path, uploads_dir: &Path) -> Result<(), ApiError> {
    if uploads_dir.is_dir() {
        for entry in fs::read_dir(uploads_dir).map_err(|e| ApiError::Storage(e.into()))? {
            let entry = entry.map_err(|e| ApiError::Storage(e.into()))?;
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "failed to remove stale upload");
            }
        }
    } else {
        fs::create_dir_all(uploads_dir).map_err(|e| ApiError::Storage(e.into()))?;
    }

    if !source.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| ApiError::Storage(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ApiError::Storage(e.into()))?;
        let target = uploads_dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| ApiError::Storage(e.into()))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ApiError::Storage(e.into()))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| ApiError::Storage(e.into()))?;
            set_file_permissions(&target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ApiError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
        .map_err(|e| ApiError::Storage(e.into()))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ApiError> {
    Ok(())
}
