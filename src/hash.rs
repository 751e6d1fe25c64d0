//! Content digests.
//!
//! Not used when deciding where a file goes; exposed for callers that want
//! to spot identical files.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size of each read while hashing.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 hash of a file and return its lowercase hex digest.
///
/// The file is streamed in [`BLOCK_SIZE`] chunks, so large files are not
/// loaded into memory.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or fully read.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BLOCK_SIZE];

    loop {
        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
