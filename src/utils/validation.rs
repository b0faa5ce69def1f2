use mime::Mime;
use thiserror::Error;

/// Image types accepted by `POST /upload`.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File too large, max file size is {}MB", .max / 1024 / 1024)]
    FileTooLarge { declared: Option<u64>, max: usize },

    #[error("Unsupported file type, must be png, jpg, jpeg, or gif")]
    UnsupportedType { declared: Option<String> },
}

/// Validates the declared request size against the upload limit.
///
/// A missing declaration passes; the body limit layer still caps what is read.
pub fn validate_declared_size(declared: Option<u64>, max_size: usize) -> Result<(), ValidationError> {
    match declared {
        Some(size) if size > max_size as u64 => Err(ValidationError::FileTooLarge {
            declared: Some(size),
            max: max_size,
        }),
        _ => Ok(()),
    }
}

/// Validates the declared MIME type of the `image` field against the allowlist.
///
/// Parameters such as `; charset=..` are ignored, the type/subtype must match exactly.
pub fn validate_mime_type(content_type: Option<&str>) -> Result<Mime, ValidationError> {
    let unsupported = || ValidationError::UnsupportedType {
        declared: content_type.map(str::to_string),
    };

    let mime: Mime = content_type
        .ok_or_else(unsupported)?
        .trim()
        .parse()
        .map_err(|_| unsupported())?;

    if ALLOWED_MIME_TYPES.contains(&mime.essence_str()) {
        Ok(mime)
    } else {
        Err(unsupported())
    }
}

/// Returns the suffix of `filename` starting at its last `.`, or `""` if there is none.
pub fn file_extension(filename: &str) -> &str {
    filename.rfind('.').map_or("", |idx| &filename[idx..])
}

/// Builds the on-disk name: the generated identifier followed by the original extension.
pub fn stored_file_name(file_id: &str, original_filename: Option<&str>) -> String {
    format!("{}{}", file_id, file_extension(original_filename.unwrap_or_default()))
}
