use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Width of a hex-encoded SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 64;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Hash the entire stream from its first byte.
///
/// The reader is rewound first, so a stream that was already partly read (e.g. by
/// a sniffing read) still yields the digest of the full content. Any read
/// error aborts and is returned as-is; no partial digest is produced.
pub fn fingerprint<R: Read + Seek>(reader: &mut R) -> io::Result<String> {
    reader.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    let mut buffered = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
    io::copy(&mut buffered, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    fingerprint(&mut file)
}

pub fn fingerprint_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            fingerprint_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            fingerprint_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_stream_matches_bytes() {
        let data = vec![0x5Au8; 200_000];
        let mut cursor = Cursor::new(data.clone());
        let fp = fingerprint(&mut cursor).unwrap();
        assert_eq!(fp, fingerprint_bytes(&data));
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_rewinds_consumed_stream() {
        let mut cursor = Cursor::new(b"hello world".to_vec());
        let mut head = [0u8; 5];
        cursor.read_exact(&mut head).unwrap();

        let fp = fingerprint(&mut cursor).unwrap();
        assert_eq!(fp, fingerprint_bytes(b"hello world"));
    }

    #[test]
    fn test_same_content_different_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.dat");
        let b = dir.path().join("nested_b.bin");
        std::fs::write(&a, b"identical bytes").unwrap();
        std::fs::write(&b, b"identical bytes").unwrap();

        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_single_byte_change() {
        assert_ne!(fingerprint_bytes(b"content-1"), fingerprint_bytes(b"content-2"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fingerprint_file(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
