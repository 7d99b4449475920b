// ABOUTME: Stable fingerprints for deduplicating recurring problems across runs.
// ABOUTME: Hashes a normalized, sorted set of configuration values plus event parts.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Configuration-identifying values for one deployment setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    values: Vec<String>,
    checkout_dir: Option<String>,
}

impl Identity {
    /// `checkout_dir` is removed from every value so the same configuration
    /// yields the same fingerprint regardless of where it was checked out.
    pub fn new<I, S>(values: I, checkout_dir: Option<&Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: values.into_iter().map(|v| v.as_ref().to_string()).collect(),
            checkout_dir: checkout_dir.map(|dir| dir.to_string_lossy().replace('\\', "/")),
        }
    }

    /// Fingerprint of the configuration combined with event-specific parts.
    ///
    /// Independent of the order of values and parts.
    pub fn fingerprint(&self, parts: &[&str]) -> u64 {
        let mut normalized: Vec<String> = self
            .values
            .iter()
            .map(String::as_str)
            .chain(parts.iter().copied())
            .map(|value| self.normalize(value))
            .filter(|value| !value.is_empty())
            .collect();
        normalized.sort();

        let mut hasher = Sha256::new();
        for value in &normalized {
            hasher.update(value.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }

    fn normalize(&self, value: &str) -> String {
        let mut value = value.trim().replace('\\', "/");
        if let Some(dir) = self.checkout_dir.as_deref().filter(|d| !d.is_empty()) {
            value = value.replace(dir, "");
        }
        value.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_does_not_matter() {
        let a = Identity::new(["app", "group", "bucket"], None);
        let b = Identity::new(["bucket", "app", "group"], None);
        assert_eq!(a.fingerprint(&["Failed"]), b.fingerprint(&["Failed"]));
    }

    #[test]
    fn case_is_folded() {
        let a = Identity::new(["MyApp"], None);
        let b = Identity::new(["myapp"], None);
        assert_eq!(a.fingerprint(&[]), b.fingerprint(&[]));
    }

    #[test]
    fn checkout_dir_is_stripped() {
        let a = Identity::new(["/agent/work/abc/dist/**"], Some(Path::new("/agent/work/abc")));
        let b = Identity::new(["/agent/work/xyz/dist/**"], Some(Path::new("/agent/work/xyz")));
        assert_eq!(a.fingerprint(&[]), b.fingerprint(&[]));
    }

    #[test]
    fn distinguishing_parts_change_the_fingerprint() {
        let identity = Identity::new(["app", "group"], None);
        let failed = identity.fingerprint(&["Failed"]);
        assert_ne!(failed, identity.fingerprint(&["Stopped"]));
        assert_ne!(failed, identity.fingerprint(&["timeout", "600"]));
        assert_ne!(
            identity.fingerprint(&["DeploymentLimitExceededException"]),
            identity.fingerprint(&["ApplicationDoesNotExistException"])
        );
    }
}
