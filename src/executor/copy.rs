//! Atomic file copy implementation

use crate::types::MansyncError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Suffix of the temporary sibling written before the final rename
pub const PART_SUFFIX: &str = ".mansync-part";

const BUFFER_SIZE: usize = 128 * 1024;

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Write to a temporary `<name>.mansync-part` sibling
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Rename over the final destination
///
/// Missing parent directories of `dest` are created. Symlinked sources are
/// followed, so the destination is always a regular file.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(MansyncError)` - IO error; the destination is left untouched
///
/// # Example
/// ```no_run
/// use mansync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), mansync::types::MansyncError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, MansyncError> {
    // ═══════════════════════════════════════════════════════════
    // STEP 1: Prepare - Create parent directories and .part path
    // ═══════════════════════════════════════════════════════════
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = part_path(dest);

    // ═══════════════════════════════════════════════════════════
    // STEP 2: Copy - Stream from src to the part file
    // ═══════════════════════════════════════════════════════════
    let mut src_file = File::open(src)?;
    let total_bytes = match write_part(&mut src_file, &part_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&part_path);
            return Err(e);
        }
    };

    // ═══════════════════════════════════════════════════════════
    // STEP 3: Metadata - Preserve permissions and mtime
    // ═══════════════════════════════════════════════════════════
    let src_metadata = src_file.metadata()?;
    drop(src_file);

    fs::set_permissions(&part_path, src_metadata.permissions())?;

    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(&part_path, mtime)?;

    // ═══════════════════════════════════════════════════════════
    // STEP 4: Commit - Rename to final destination
    // ═══════════════════════════════════════════════════════════
    if let Err(e) = fs::rename(&part_path, dest) {
        let _ = fs::remove_file(&part_path);
        return Err(e.into());
    }

    Ok(total_bytes)
}

fn write_part(src_file: &mut File, part_path: &Path) -> Result<u64, MansyncError> {
    let mut part_file = File::create(part_path)?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        part_file.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;
    // Dropped here, before the rename (required on Windows)
    Ok(total_bytes)
}

/// `<dest>.mansync-part`, the sibling a write goes to before its final rename
pub(crate) fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}
