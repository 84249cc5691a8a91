//! Streaming SHA-256 for RECORD entries.

use std::io::{self, Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Bytes read per step; bounds memory regardless of file size.
pub const PAGE_SIZE: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileDigest {
    pub sha256: [u8; 32],
    pub len: u64,
}

impl FileDigest {
    /// `sha256=<urlsafe base64, unpadded>` as written in RECORD.
    pub fn record_hash(&self) -> String {
        format!("sha256={}", encode_digest(&self.sha256))
    }
}

pub fn encode_digest(raw: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(raw)
}

/// Copy `reader` into `writer` page by page, hashing what passes through.
pub fn copy_hashed<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<FileDigest> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; PAGE_SIZE];
    let mut len = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buffer[..read]);
        writer.write_all(&buffer[..read])?;
        len += read as u64;
    }
    Ok(FileDigest {
        sha256: hasher.finalize().into(),
        len,
    })
}

pub fn digest<R: Read>(reader: &mut R) -> io::Result<FileDigest> {
    copy_hashed(reader, &mut io::sink())
}

pub fn digest_bytes(data: &[u8]) -> FileDigest {
    FileDigest {
        sha256: Sha256::digest(data).into(),
        len: data.len() as u64,
    }
}
