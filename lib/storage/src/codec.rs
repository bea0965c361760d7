// Artifact file codecs. The format follows the file name: `.json` is JSON,
// `.bin` is bincode, and a trailing `.gz` adds gzip on top of either.
use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Bincode,
}

fn format_of(path: &Path) -> Result<(Format, bool)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("artifact path {:?} has no file name", path))?;
    let (name, gzipped) = match name.strip_suffix(".gz") {
        Some(inner) => (inner, true),
        None => (name, false),
    };
    let format = match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => Format::Json,
        Some("bin") | Some("bincode") => Format::Bincode,
        other => bail!("unsupported artifact extension {:?} for {:?}", other, path),
    };
    Ok((format, gzipped))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Read and decode an artifact, verifying the checksum of the stored
/// bytes first when one is given.
pub fn read_artifact<T: DeserializeOwned>(path: &Path, checksum: Option<&str>) -> Result<T> {
    let (format, gzipped) = format_of(path)?;
    let stored = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    if let Some(expected) = checksum {
        let actual = sha256_hex(&stored);
        if !actual.eq_ignore_ascii_case(expected) {
            bail!(
                "checksum mismatch for {}: expected {}, got {}",
                path.display(),
                expected,
                actual
            );
        }
    }

    let bytes = if gzipped {
        let mut decoder = GzDecoder::new(stored.as_slice());
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .with_context(|| format!("decompressing {}", path.display()))?;
        out
    } else {
        stored
    };

    match format {
        Format::Json => serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding JSON from {}", path.display())),
        Format::Bincode => bincode::deserialize(&bytes)
            .map_err(|e| anyhow!("decoding bincode from {}: {}", path.display(), e)),
    }
}

/// Encode and write an artifact, returning the SHA-256 of the written bytes.
pub fn write_artifact<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<String> {
    let (format, gzipped) = format_of(path)?;
    let encoded = match format {
        Format::Json => serde_json::to_vec(value)?,
        Format::Bincode => bincode::serialize(value)
            .map_err(|e| anyhow!("encoding bincode for {}: {}", path.display(), e))?,
    };

    let stored = if gzipped {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        encoder.finish()?
    } else {
        encoded
    };

    // Write to a temporary file first, then rename into place
    let temp = path.with_extension("tmp");
    fs::write(&temp, &stored).with_context(|| format!("writing {}", temp.display()))?;
    fs::rename(&temp, path).with_context(|| format!("renaming into {}", path.display()))?;

    Ok(sha256_hex(&stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_gzipped_bincode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.bin.gz");
        let rows = vec![vec![1.0f32, 0.5], vec![0.5, 1.0]];

        let checksum = write_artifact(&path, &rows).unwrap();
        let back: Vec<Vec<f32>> = read_artifact(&path, Some(&checksum)).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        write_artifact(&path, &vec!["a", "b"]).unwrap();

        let err = read_artifact::<Vec<String>>(&path, Some("deadbeef")).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.pkl");
        assert!(write_artifact(&path, &1u32).is_err());
        assert!(read_artifact::<u32>(&path, None).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact::<u32>(&dir.path().join("absent.json"), None).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
