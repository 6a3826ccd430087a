//! Job identity derivation.
//!
//! Maps an input locator (URL) to a stable, filesystem-safe key that
//! namespaces the job's checkpoint directory.

use sha2::{Digest, Sha256};

/// Derive the job key for an input locator.
///
/// The key is the SHA-256 digest of the trimmed locator as lowercase hex.
/// Identical inputs always map to the same key, so a re-run finds the same
/// state directory. The key only partitions storage; a collision would
/// alias two jobs' directories, not corrupt content.
pub fn job_identity(locator: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(locator.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_stable() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(job_identity(url), job_identity(url));
    }

    #[test]
    fn distinct_locators_get_distinct_keys() {
        let a = job_identity("https://example.com/a");
        let b = job_identity("https://example.com/b");
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_path_safe_hex() {
        let key = job_identity("https://example.com/watch?v=abc&t=10");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key.chars().all(|c| !c.is_uppercase()));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            job_identity("  https://example.com/a \n"),
            job_identity("https://example.com/a")
        );
    }
}
