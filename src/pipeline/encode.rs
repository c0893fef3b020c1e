//! Document encoding: raw bytes → base64 for the `inline_data` part.
//!
//! The endpoint expects the bare base64 payload, without the
//! `data:<mime>;base64,` prefix a browser data URL would carry.

use super::input::{FileSource, UploadedFile};
use crate::error::BrieflyError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read `file` (if path-backed) and base64 it.
///
/// # Errors
/// [`BrieflyError::ReadFailed`] when the file cannot be read.
pub async fn encode_file(file: &UploadedFile) -> Result<String, BrieflyError> {
    let b64 = match &file.source {
        FileSource::Bytes(bytes) => encode_bytes(bytes),
        FileSource::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| BrieflyError::ReadFailed {
                    name: file.name.clone(),
                    source,
                })?;
            encode_bytes(&bytes)
        }
    };
    debug!("Encoded '{}' → {} bytes base64", file.name, b64.len());
    Ok(b64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let samples: [&[u8]; 4] = [b"", b"\x00", b"%PDF-1.7\n\xFF\xFE\x00binary", &[0xABu8; 1027]];
        for original in samples {
            let b64 = encode_bytes(original);
            assert!(!b64.starts_with("data:"));
            assert_eq!(STANDARD.decode(&b64).unwrap(), original);
        }
    }

    #[tokio::test]
    async fn encodes_path_backed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89u8, b'P', b'N', b'G']).unwrap();

        let file = UploadedFile::from_path(&path, None).await.unwrap();
        let b64 = encode_file(&file).await.unwrap();
        assert_eq!(STANDARD.decode(b64).unwrap(), vec![0x89u8, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn vanished_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let file = UploadedFile::from_path(&path, None).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = encode_file(&file).await.unwrap_err();
        assert!(matches!(err, BrieflyError::ReadFailed { .. }));
        assert!(err.to_string().contains("unreadable"));
    }
}
