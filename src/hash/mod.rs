//! Hashing utilities

use crate::types::MansyncError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read buffer size; affects memory use only, never the digest
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the Blake3 checksum of a file as lowercase hex
///
/// The file is streamed in 64KB chunks, so memory use is bounded regardless
/// of file size. Symlinks are followed by `File::open`.
///
/// # Errors
/// Any open or read failure is returned as `MansyncError::Io`; no partial
/// digest is ever produced.
///
/// # Example
/// ```no_run
/// use mansync::hash::compute_checksum;
/// use std::path::Path;
///
/// let checksum = compute_checksum(Path::new("file.txt"))?;
/// assert_eq!(checksum.len(), 64);
/// # Ok::<(), mansync::types::MansyncError>(())
/// ```
pub fn compute_checksum(file_path: &Path) -> Result<String, MansyncError> {
    let mut file = File::open(file_path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
