//! Transient stash of in-progress signup data.
//!
//! Signup and verification happen in separate invocations, so the submitted
//! form is parked on disk in between: written when the signup request goes
//! out, read back to drive verification and resends, deleted as soon as the
//! account is verified (or the signup is discarded). Nothing else is ever
//! persisted locally.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::types::SignupRequest;

const CACHE_FILE: &str = "pending_signup.json";

pub struct PendingSignupCache {
    path: PathBuf,
}

impl PendingSignupCache {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CACHE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Park a submitted signup awaiting verification
    pub fn save(&self, request: &SignupRequest) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(request)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Load the pending signup, if one is parked
    pub fn load(&self) -> Result<Option<SignupRequest>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let request = serde_json::from_str(&content)
            .with_context(|| "Pending signup cache is corrupted")?;
        Ok(Some(request))
    }

    /// Remove the stash; called once verification succeeds
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> SignupRequest {
        SignupRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Abcdef12".to_string(),
        }
    }

    #[test]
    fn test_save_load_clear_round_trip() {
        let dir = tempdir().unwrap();
        let cache = PendingSignupCache::new(dir.path());

        assert!(cache.load().unwrap().is_none());

        cache.save(&sample()).unwrap();
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.email, "ada@example.com");
        assert_eq!(loaded.name, "Ada");

        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        // Clearing an already-empty cache is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let cache = PendingSignupCache::new(&nested);

        cache.save(&sample()).unwrap();
        assert!(cache.load().unwrap().is_some());
    }

    #[test]
    fn test_corrupted_cache_is_an_error_not_a_panic() {
        let dir = tempdir().unwrap();
        let cache = PendingSignupCache::new(dir.path());
        fs::write(cache.path(), "not json").unwrap();

        assert!(cache.load().is_err());
    }
}
