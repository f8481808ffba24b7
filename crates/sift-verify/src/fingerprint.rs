use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

use crate::{Hasher, Result, Sha256Hasher, VerifyError};

/// Read size used when hashing a stream.
pub const CHUNK_SIZE: usize = 4096;

/// SHA-256 digest of a resource's complete byte content.
///
/// Two resources are treated as identical iff their fingerprints are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self { Self(bytes) }

    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self { Self(Sha256Hasher::digest(data)) }

    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    pub fn to_hex(&self) -> String { hex::encode(self.0) }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl FromStr for Fingerprint {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| VerifyError::Parse(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Hash everything `reader` yields, reading [`CHUNK_SIZE`] bytes at a time.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<Fingerprint> {
    let mut hasher = Sha256Hasher::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(VerifyError::Io(e)),
        };
        hasher.update(&buf[..n]);
    }

    Ok(Fingerprint(hasher.finalize()))
}

/// Fingerprint the file at `path`.
pub fn fingerprint_file(path: impl AsRef<Path>) -> Result<Fingerprint> {
    let path = path.as_ref();
    let read_err = |source| VerifyError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    fingerprint_reader(file).map_err(|e| match e {
        VerifyError::Io(source) => read_err(source),
        other => other,
    })
}
