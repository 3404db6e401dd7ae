//! Common validation utilities.

use validator::ValidationError;

/// Minimum length of a report request title.
pub const MIN_TITLE_LENGTH: usize = 3;

/// Maximum attachment size in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types admitted for uploads: PDF, Office/OpenXML spreadsheet and document
/// formats, CSV, and common raster images.
pub const ALLOWED_FILE_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/csv",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Validates that a request title meets the minimum length.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().chars().count() >= MIN_TITLE_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("title_length");
        err.message = Some("Title must be at least 3 characters".into());
        Err(err)
    }
}

/// Validates a fiscal-year label (a four-digit year string, e.g. "2567").
pub fn validate_fiscal_year_label(label: &str) -> Result<(), ValidationError> {
    if label.len() == 4 && label.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("fiscal_year_label");
        err.message = Some("Fiscal year must be a four-digit year".into());
        Err(err)
    }
}

/// Returns true if the declared MIME type is in the upload allow-list.
pub fn is_allowed_file_type(mime: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(&mime)
}

/// Returns true if the byte size is within the upload ceiling.
pub fn is_allowed_file_size(size: u64) -> bool {
    size <= MAX_FILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Monthly OPD visits").is_ok());
        assert!(validate_title("abc").is_ok());
        assert!(validate_title("ab").is_err());
        assert!(validate_title("  a  ").is_err());
    }

    #[test]
    fn test_validate_title_counts_chars_not_bytes() {
        // Thai characters are multi-byte; three of them are still a valid title.
        assert!(validate_title("กขค").is_ok());
    }

    #[test]
    fn test_validate_fiscal_year_label() {
        assert!(validate_fiscal_year_label("2567").is_ok());
        assert!(validate_fiscal_year_label("256").is_err());
        assert!(validate_fiscal_year_label("25678").is_err());
        assert!(validate_fiscal_year_label("abcd").is_err());
    }

    #[test]
    fn test_allowed_file_types() {
        assert!(is_allowed_file_type("application/pdf"));
        assert!(is_allowed_file_type("text/csv"));
        assert!(is_allowed_file_type("image/png"));
        assert!(!is_allowed_file_type("application/zip"));
        assert!(!is_allowed_file_type("application/x-msdownload"));
    }

    #[test]
    fn test_allowed_file_size() {
        assert!(is_allowed_file_size(0));
        assert!(is_allowed_file_size(MAX_FILE_SIZE));
        assert!(!is_allowed_file_size(MAX_FILE_SIZE + 1));
        // 12 MiB PDF must be refused
        assert!(!is_allowed_file_size(12 * 1024 * 1024));
    }
}
