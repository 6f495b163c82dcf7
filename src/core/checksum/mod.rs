//! # Checksum Module
//!
//! Computes content digests for archive files.
//!
//! ## Supported Algorithms
//! - **md5** - fast, legacy verification
//! - **sha1** - legacy verification
//! - **sha256** - default, used for duplicate detection
//!
//! Files are streamed in [`CHUNK_SIZE`] blocks, so memory use does not grow
//! with file size. Identical bytes under the same algorithm always give the
//! same digest; duplicate detection relies on nothing else.
//!
//! ## Example
//! ```rust,ignore
//! use archive_steward::core::checksum::{compute_checksum, ChecksumAlgorithm};
//!
//! let digest = compute_checksum(&path, "sha1".parse()?)?;
//! ```

use crate::error::{ArchiveError, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Read buffer size for streaming digests
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Closed set of digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
        }
    }

    /// Length of the hex digest this algorithm produces
    pub fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 32,
            ChecksumAlgorithm::Sha1 => 40,
            ChecksumAlgorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(ArchiveError::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Hex digest of the file at `path`.
///
/// # Errors
/// `NotFound` if the file cannot be opened because it is absent, `Io` if it
/// cannot be opened or read part-way through.
pub fn compute_checksum(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String> {
    let file = File::open(path).map_err(|e| ArchiveError::from_io(path, e))?;
    let digest = checksum_reader(file, algorithm).map_err(|e| ArchiveError::from_io(path, e))?;

    debug!(path = %path.display(), %algorithm, %digest, "computed checksum");
    Ok(digest)
}

/// Parse the algorithm name first, then hash.
///
/// Convenience for callers holding a user-supplied name.
pub fn compute_checksum_named(path: &Path, algorithm: &str) -> Result<String> {
    compute_checksum(path, algorithm.parse()?)
}

/// Hex digest of everything `reader` yields
pub fn checksum_reader<R: Read>(reader: R, algorithm: ChecksumAlgorithm) -> io::Result<String> {
    match algorithm {
        ChecksumAlgorithm::Md5 => digest_stream::<Md5, _>(reader),
        ChecksumAlgorithm::Sha1 => digest_stream::<Sha1, _>(reader),
        ChecksumAlgorithm::Sha256 => digest_stream::<Sha256, _>(reader),
    }
}

fn digest_stream<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            checksum_reader(&b"abc"[..], ChecksumAlgorithm::Md5).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            checksum_reader(&b"abc"[..], ChecksumAlgorithm::Sha1).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            checksum_reader(&b"abc"[..], ChecksumAlgorithm::Sha256).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_digest_is_lowercase_and_zero_padded() {
        // md5("a") starts with 0x0c, which must keep its leading zero
        let digest = checksum_reader(&b"a"[..], ChecksumAlgorithm::Md5).unwrap();
        assert_eq!(digest, "0cc175b9c0f1b6a831c399e269772661");
    }

    #[test]
    fn empty_input_has_digest() {
        assert_eq!(
            checksum_reader(&b""[..], ChecksumAlgorithm::Sha256).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_length_matches_algorithm() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "doc.txt", b"archive content");

        for algorithm in [
            ChecksumAlgorithm::Md5,
            ChecksumAlgorithm::Sha1,
            ChecksumAlgorithm::Sha256,
        ] {
            let digest = compute_checksum(&path, algorithm).unwrap();
            assert_eq!(digest.len(), algorithm.hex_len());
        }
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "doc.txt", b"archive content");

        let first = compute_checksum(&path, ChecksumAlgorithm::Sha256).unwrap();
        let second = compute_checksum(&path, ChecksumAlgorithm::Sha256).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn identical_content_same_digest() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_file(&temp_dir, "a.bin", b"same bytes");
        let b = write_file(&temp_dir, "b.bin", b"same bytes");
        let c = write_file(&temp_dir, "c.bin", b"other bytes");

        let digest_a = compute_checksum(&a, ChecksumAlgorithm::Md5).unwrap();
        let digest_b = compute_checksum(&b, ChecksumAlgorithm::Md5).unwrap();
        let digest_c = compute_checksum(&c, ChecksumAlgorithm::Md5).unwrap();

        assert_eq!(digest_a, digest_b);
        assert_ne!(digest_a, digest_c);
    }

    #[test]
    fn content_larger_than_one_chunk() {
        let temp_dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let path = write_file(&temp_dir, "big.bin", &content);

        let streamed = compute_checksum(&path, ChecksumAlgorithm::Sha256).unwrap();
        let whole = format!("{:x}", Sha256::digest(&content));
        assert_eq!(streamed, whole);
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = compute_checksum(
            Path::new("/nonexistent/archive/file.bin"),
            ChecksumAlgorithm::Sha256,
        );
        assert!(matches!(result, Err(ArchiveError::NotFound { .. })));
    }

    #[test]
    fn unsupported_algorithm_rejected() {
        assert!(matches!(
            "crc32".parse::<ChecksumAlgorithm>(),
            Err(ArchiveError::UnsupportedAlgorithm { .. })
        ));

        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "doc.txt", b"x");
        assert!(matches!(
            compute_checksum_named(&path, "sha512"),
            Err(ArchiveError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn algorithm_names_round_trip() {
        assert_eq!("SHA256".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Sha256);
        assert_eq!(ChecksumAlgorithm::default(), ChecksumAlgorithm::Sha256);
        assert_eq!(ChecksumAlgorithm::Md5.to_string(), "md5");
    }
}
