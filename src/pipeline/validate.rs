//! Local gate on type and size. Nothing rejected here reaches the network.

use super::input::UploadedFile;
use crate::error::ValidationError;

/// MIME types accepted for extraction.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/tiff",
];

/// Upload limit: 50 MiB.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Check a candidate's declared type and size. Type is checked first.
pub fn validate(mime_type: &str, size: u64) -> Result<(), ValidationError> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(ValidationError::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }
    if size > MAX_FILE_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            limit: MAX_FILE_BYTES,
        });
    }
    Ok(())
}

pub fn validate_file(file: &UploadedFile) -> Result<(), ValidationError> {
    validate(&file.mime_type, file.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_type_at_the_limit() {
        for mime in ALLOWED_MIME_TYPES {
            assert_eq!(validate(mime, 0), Ok(()));
            assert_eq!(validate(mime, MAX_FILE_BYTES), Ok(()), "{mime}");
        }
    }

    #[test]
    fn rejects_one_byte_over() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(matches!(
                validate(mime, MAX_FILE_BYTES + 1),
                Err(ValidationError::TooLarge { .. })
            ));
        }
    }

    #[test]
    fn rejects_other_types() {
        for mime in [
            "text/plain",
            "image/gif",
            "application/octet-stream",
            "",
            "APPLICATION/PDF",
        ] {
            assert!(
                matches!(
                    validate(mime, 10),
                    Err(ValidationError::UnsupportedType { .. })
                ),
                "{mime}"
            );
        }
    }

    #[test]
    fn oversized_wrong_type_is_still_rejected() {
        assert!(validate("text/html", MAX_FILE_BYTES * 2).is_err());
    }

    #[test]
    fn limit_is_52_428_800() {
        assert_eq!(MAX_FILE_BYTES, 52_428_800);
    }
}
