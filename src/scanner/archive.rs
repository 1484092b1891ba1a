//! ZIP archive member enumeration and hashing.
//!
//! Members are listed through the archive's central directory. Directory
//! entries are skipped; every other entry is decompressed and streamed
//! through the [`Hasher`]. Member sizes come from the stored uncompressed
//! size, never from the compressed bytes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use super::{HashError, Hasher, LogicalPath, ScanItem};

fn open_archive(archive: &Path) -> Result<ZipArchive<BufReader<File>>, HashError> {
    let logical = LogicalPath::from(archive);
    let file = File::open(archive).map_err(|e| HashError::from_io(logical.clone(), e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| HashError::Archive {
        path: logical,
        source,
    })
}

/// Hash every non-directory member of `archive`.
///
/// The outer `Result` fails when the archive itself cannot be opened or its
/// central directory is unreadable. Each inner result covers one member, so
/// a single corrupt entry does not hide its siblings.
///
/// # Errors
///
/// Returns `HashError` if the archive cannot be opened as a ZIP file.
pub fn hash_members(
    archive: &Path,
    hasher: &Hasher,
) -> Result<Vec<Result<ScanItem, HashError>>, HashError> {
    let mut zip = open_archive(archive)?;
    let mut results = Vec::with_capacity(zip.len());

    for index in 0..zip.len() {
        let entry = match zip.by_index(index) {
            Ok(entry) => entry,
            Err(source) => {
                results.push(Err(HashError::Archive {
                    path: LogicalPath::archive_member(archive, format!("<entry {index}>")),
                    source,
                }));
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let logical = LogicalPath::archive_member(archive, entry.name());
        let size = entry.size();

        match hasher.hash_reader(entry) {
            Ok(fingerprint) => {
                log::trace!("Hashed {} -> {}", logical, fingerprint.short());
                results.push(Ok(ScanItem {
                    path: logical,
                    fingerprint,
                    size,
                }));
            }
            Err(e) => {
                log::warn!("Failed to read archive member {}: {}", logical, e);
                results.push(Err(HashError::from_io(logical, e)));
            }
        }
    }

    Ok(results)
}

/// Uncompressed size of a single member, as recorded in the central directory.
///
/// # Errors
///
/// - `Archive` if the archive cannot be read
/// - `NotFound` if the member is no longer present
pub fn member_size(archive: &Path, member: &str) -> Result<u64, HashError> {
    let mut zip = open_archive(archive)?;
    let entry = zip.by_name(member).map_err(|source| match source {
        zip::result::ZipError::FileNotFound => {
            HashError::NotFound(LogicalPath::archive_member(archive, member))
        }
        source => HashError::Archive {
            path: LogicalPath::archive_member(archive, member),
            source,
        },
    })?;
    Ok(entry.size())
}

/// Whether `member` still exists inside `archive`.
#[must_use]
pub fn contains_member(archive: &Path, member: &str) -> bool {
    member_size(archive, member).is_ok()
}
