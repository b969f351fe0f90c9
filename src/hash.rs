//! Streaming content hashing.
//!
//! Clips are identified on disk by their SHA-256 digest. Files are hashed
//! in fixed-size chunks so large videos never have to fit in memory.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Read size used when folding a file into the hash accumulator (128 KiB)
const CHUNK_BYTES: usize = 128 * 1024;

/// Compute the SHA-256 digest of a file, returned as lowercase hex.
///
/// Reads the file in [`CHUNK_BYTES`] chunks until exhaustion. IO errors
/// (missing file, unreadable path) surface to the caller; nothing is retried.
pub async fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_BYTES];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
