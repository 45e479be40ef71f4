use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide slot for the long-lived platform token.
///
/// Concurrent requests may race on this during a refresh; last writer wins,
/// which is acceptable because any valid token from the provider works. The
/// guarded cell keeps that race visible instead of burying it in a module
/// global.
pub type TokenSlot = Arc<RwLock<Option<String>>>;

/// Loads and persists the long-lived Facebook user token.
///
/// The configured value takes precedence; the on-disk file exists so a token
/// obtained by refresh survives process restarts. The file is plaintext,
/// which is inherited behavior — every credential in the process flows
/// through this store or the startup configuration, nowhere else.
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
    configured: Option<String>,
}

impl TokenStore {
    pub fn new(data_dir: &str, configured: Option<String>) -> Self {
        Self {
            path: PathBuf::from(data_dir)
                .join("credentials")
                .join("facebook_token.txt"),
            configured,
        }
    }

    /// The configured value wins; otherwise fall back to the persisted file,
    /// trimming surrounding whitespace. `None` means "not configured", which
    /// callers treat as a valid silent state.
    pub fn load(&self) -> Option<String> {
        if let Some(token) = &self.configured {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }

        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    /// Best-effort persistence: the in-memory slot stays authoritative for
    /// the rest of the process lifetime, so a failed write is logged and
    /// otherwise ignored.
    pub fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("failed to create credential directory: {}", e);
                return;
            }
        }

        if let Err(e) = std::fs::write(&self.path, token) {
            tracing::warn!("failed to persist access token: {}", e);
        }
    }

    /// A fresh slot seeded from `load()`.
    pub fn slot(&self) -> TokenSlot {
        Arc::new(RwLock::new(self.load()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &tempfile::TempDir, configured: Option<&str>) -> TokenStore {
        TokenStore::new(
            dir.path().to_str().unwrap(),
            configured.map(str::to_string),
        )
    }

    #[test]
    fn load_returns_none_when_nothing_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir, None).load(), None);
    }

    #[test]
    fn configured_value_wins_over_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some("configured-token"));
        store.save("persisted-token");

        assert_eq!(store.load(), Some("configured-token".to_string()));
    }

    #[test]
    fn save_then_load_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, None);
        store.save("EAAGtoken");

        assert_eq!(store.load(), Some("EAAGtoken".to_string()));
    }

    #[test]
    fn load_trims_surrounding_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, None);
        store.save("  EAAGtoken\n");

        assert_eq!(store.load(), Some("EAAGtoken".to_string()));
    }

    #[test]
    fn whitespace_only_file_counts_as_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, None);
        store.save("   \n");

        assert_eq!(store.load(), None);
    }

    #[tokio::test]
    async fn slot_is_seeded_from_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, Some("seed"));

        assert_eq!(store.slot().read().await.clone(), Some("seed".to_string()));
    }
}
