//! BLAKE3 content hashing.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::DedupError;

const READ_BUF_SIZE: usize = 64 * 1024;

/// BLAKE3 content hash used as the duplicate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash::new(*blake3::hash(data).as_bytes())
}

/// Hash a file's full contents, returning the digest and the bytes read.
///
/// The file handle is closed before returning, on success or error.
pub fn hash_file(path: &Path) -> Result<(ContentHash, u64), DedupError> {
    let mut file = File::open(path).map_err(|e| DedupError::io(path, e))?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; READ_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| DedupError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((ContentHash::new(*hasher.finalize().as_bytes()), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "same content").unwrap();

        let (first, len) = hash_file(&path).unwrap();
        let (second, _) = hash_file(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(len, 12);
        assert_eq!(first, hash_bytes(b"same content"));
    }

    #[test]
    fn test_hash_spans_buffer_boundary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.bin");
        let data: Vec<u8> = (0..READ_BUF_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let (hash, len) = hash_file(&path).unwrap();
        assert_eq!(len, data.len() as u64);
        assert_eq!(hash, hash_bytes(&data));
    }

    #[test]
    fn test_different_content_differs() {
        assert_ne!(hash_bytes(b"one"), hash_bytes(b"two"));
    }

    #[test]
    fn test_hex() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_string().starts_with("abab"));
    }

    #[test]
    fn test_missing_file() {
        let err = hash_file(Path::new("/no/such/file")).unwrap_err();
        assert!(matches!(err, DedupError::NotFound { .. }));
    }
}
