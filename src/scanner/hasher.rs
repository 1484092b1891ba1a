//! SHA-256 content hasher with streaming support.
//!
//! # Overview
//!
//! The [`Hasher`] reads its input in fixed-size blocks (64 KiB by default) so
//! memory use does not depend on file size. The same routine hashes real
//! files and decompressed ZIP member streams, which is what lets a file and
//! an identical archive member land in the same duplicate group.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let fingerprint = hasher.hash_file(Path::new("photo.jpg")).unwrap();
//! println!("{}", fingerprint);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::{HashError, LogicalPath};

/// Block size used for streaming reads (64 KiB).
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 digest of a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already hex-encoded digest.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The lowercase hexadecimal digest (64 characters).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    block_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher reading in [`BLOCK_SIZE`] blocks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            block_size: BLOCK_SIZE,
        }
    }

    /// Override the read block size (minimum 1 byte).
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Current read block size.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut digest = Sha256::new();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.update(&buffer[..read]);
        }

        Ok(Fingerprint(format!("{:x}", digest.finalize())))
    }

    /// Hash an in-memory buffer.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> Fingerprint {
        Fingerprint(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Hash a regular file by reading it sequentially.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file vanished
    /// - `PermissionDenied` if it cannot be opened
    /// - `Io` for any other read failure
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let logical = LogicalPath::from(path);
        let file = File::open(path).map_err(|e| HashError::from_io(logical.clone(), e))?;
        let fingerprint = self
            .hash_reader(file)
            .map_err(|e| HashError::from_io(logical, e))?;

        log::trace!("Hashed {} -> {}", path.display(), fingerprint.short());
        Ok(fingerprint)
    }
}
