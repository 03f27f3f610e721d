use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating account identifiers issued by the auth provider.
    /// Opaque, URL-safe, bounded length.
    /// - Valid: "usr_8f2k1", "a1b2c3", "account-42"
    /// - Invalid: "", "user id", "usr/8f2k1", ids longer than 64 chars
    pub static ref ACCOUNT_ID_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").unwrap();

    /// Regex for validating MIME types on attachment metadata
    /// - Valid: "image/png", "application/pdf", "image/svg+xml"
    /// - Invalid: "image", "image/", "/png", "image png"
    pub static ref MIME_TYPE_REGEX: Regex =
        Regex::new(r"^[a-z]+/[a-z0-9][a-z0-9.+-]*$").unwrap();
}

/// Validate an object storage key received from the upload service.
/// Keys are relative paths: no leading slash, no traversal segments.
pub fn is_safe_storage_key(key: &str) -> bool {
    if key.is_empty() || key.len() > 512 {
        return false;
    }
    if key.starts_with('/') || key.ends_with('/') {
        return false;
    }
    key.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_regex_valid() {
        assert!(ACCOUNT_ID_REGEX.is_match("usr_8f2k1"));
        assert!(ACCOUNT_ID_REGEX.is_match("a1b2c3"));
        assert!(ACCOUNT_ID_REGEX.is_match("account-42"));
        assert!(ACCOUNT_ID_REGEX.is_match("A"));
    }

    #[test]
    fn test_account_id_regex_invalid() {
        assert!(!ACCOUNT_ID_REGEX.is_match("")); // empty
        assert!(!ACCOUNT_ID_REGEX.is_match("user id")); // space
        assert!(!ACCOUNT_ID_REGEX.is_match("usr/8f2k1")); // slash
        assert!(!ACCOUNT_ID_REGEX.is_match(&"x".repeat(65))); // too long
    }

    #[test]
    fn test_mime_type_regex() {
        assert!(MIME_TYPE_REGEX.is_match("image/png"));
        assert!(MIME_TYPE_REGEX.is_match("application/pdf"));
        assert!(MIME_TYPE_REGEX.is_match("image/svg+xml"));
        assert!(!MIME_TYPE_REGEX.is_match("image"));
        assert!(!MIME_TYPE_REGEX.is_match("image/"));
        assert!(!MIME_TYPE_REGEX.is_match("/png"));
        assert!(!MIME_TYPE_REGEX.is_match("image png"));
    }

    #[test]
    fn test_storage_key_accepts_relative_paths() {
        assert!(is_safe_storage_key("chat/2026/08/report.pdf"));
        assert!(is_safe_storage_key("single-file.png"));
        assert!(is_safe_storage_key("a_b/c.d/e-f.jpg"));
    }

    #[test]
    fn test_storage_key_rejects_traversal_and_absolute() {
        assert!(!is_safe_storage_key(""));
        assert!(!is_safe_storage_key("/etc/passwd"));
        assert!(!is_safe_storage_key("a/../b.png"));
        assert!(!is_safe_storage_key("a//b.png"));
        assert!(!is_safe_storage_key("trailing/"));
        assert!(!is_safe_storage_key("has space.png"));
        assert!(!is_safe_storage_key(&"k".repeat(513)));
    }
}
