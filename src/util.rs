//! Shared utility functions

use sha2::{Digest, Sha256};

/// Short content fingerprint: `sha256:` and the first 16 hex digits
///
/// # Examples
/// ```
/// use apigap::util::fingerprint;
/// assert_eq!(fingerprint("").len(), "sha256:".len() + 16);
/// assert_eq!(fingerprint("a"), fingerprint("a"));
/// ```
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("sha256:{}", hex::encode(&digest[..8]))
}

/// Report heading for a category name
///
/// # Examples
/// ```
/// use apigap::util::section_title;
/// assert_eq!(section_title("disaster-recovery"), "DISASTER RECOVERY OPERATIONS");
/// ```
pub fn section_title(category: &str) -> String {
    let words: Vec<String> = category
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| w.to_uppercase())
        .collect();
    format!("{} OPERATIONS", words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        assert_eq!(
            fingerprint(""),
            "sha256:e3b0c44298fc1c14"
        );
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title("backup"), "BACKUP OPERATIONS");
        assert_eq!(section_title("service-level"), "SERVICE LEVEL OPERATIONS");
        assert_eq!(section_title("vm"), "VM OPERATIONS");
    }
}
